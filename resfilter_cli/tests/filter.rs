mod common;

use resfilter_core::AnyEmptyResult;
use rstest::rstest;
use similar_asserts::assert_eq;

const SAMPLE_CONFIG: &str = r#"
[properties]
name = "demo"
greeting = "hello ${name}"

[project]
version = "1.0.0"

[project.build]
finalName = "demo-1.0.0"
"#;

#[test]
fn filters_stdin_with_definitions() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("-D")
		.arg("name=world")
		.write_stdin("hello ${name} and @name@")
		.assert()
		.success()
		.stdout("hello world and world");

	Ok(())
}

#[test]
fn filters_file_with_discovered_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("resfilter.toml"), SAMPLE_CONFIG)?;
	let input = tmp.path().join("input.txt");
	std::fs::write(
		&input,
		"${greeting}: @project.version@ ${pom.build.finalName} ${version}\n",
	)?;

	common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg(&input)
		.assert()
		.success()
		.stdout("hello demo: 1.0.0 demo-1.0.0 1.0.0\n");

	Ok(())
}

#[test]
fn definitions_override_config_properties() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join(".resfilter.toml"), SAMPLE_CONFIG)?;

	common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("-D")
		.arg("name=override")
		.write_stdin("${greeting}")
		.assert()
		.success()
		.stdout("hello override");

	Ok(())
}

#[test]
fn explicit_config_skips_discovery() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("resfilter.toml"), "[properties]\nname = \"discovered\"\n")?;
	let explicit = tmp.path().join("custom.toml");
	std::fs::write(&explicit, "[properties]\nname = \"explicit\"\n")?;

	common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--config")
		.arg(&explicit)
		.write_stdin("${name}")
		.assert()
		.success()
		.stdout("explicit");

	Ok(())
}

#[rstest]
#[case::lf("lf", "a\r\nb\rc", "a\nb\nc")]
#[case::crlf("crlf", "a\nb", "a\r\nb")]
#[case::cr("cr", "a\r\nb", "a\rb")]
fn normalizes_line_endings(#[case] line_ending: &str, #[case] input: &str, #[case] expected: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--line-ending")
		.arg(line_ending)
		.write_stdin(input)
		.assert()
		.success()
		.stdout(expected.to_string());

	Ok(())
}

#[test]
fn delimiter_flag_replaces_defaults() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("-D")
		.arg("name=world")
		.arg("--delimiter")
		.arg("@")
		.write_stdin("${name} @name@")
		.assert()
		.success()
		.stdout("${name} world");

	Ok(())
}

#[test]
fn escape_string_keeps_expression_literal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("-D")
		.arg("name=world")
		.arg("--escape-string")
		.arg("\\")
		.write_stdin("\\${name} ${name}")
		.assert()
		.success()
		.stdout("${name} world");

	Ok(())
}

#[test]
fn unresolved_expressions_pass_through() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("${missing} @also.missing@ ${unterminated")
		.assert()
		.success()
		.stdout("${missing} @also.missing@ ${unterminated");

	Ok(())
}

#[test]
fn cycles_are_reported_on_stderr() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("resfilter.toml"),
		"[properties]\na = \"${b}\"\nb = \"${a}\"\n",
	)?;

	common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("value: ${a}")
		.assert()
		.success()
		.stdout("value: ${a}")
		.stderr(predicates::str::contains("expression cycle detected: a -> b -> a"));

	Ok(())
}

#[test]
fn invalid_definition_is_rejected() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("-D")
		.arg("novalue")
		.write_stdin("")
		.assert()
		.failure()
		.stderr(predicates::str::contains("invalid property definition"));

	Ok(())
}

#[test]
fn invalid_config_exits_with_diagnostic() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("resfilter.toml"), "delimiters = [")?;

	common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("${name}")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}

#[test]
fn invalid_delimiter_exits_with_diagnostic() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--delimiter")
		.arg("*}")
		.write_stdin("${name}")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("invalid delimiter specification"));

	Ok(())
}

#[test]
fn missing_input_file_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg(tmp.path().join("does-not-exist.txt"))
		.assert()
		.code(2);

	Ok(())
}

#[test]
fn session_settings_and_local_repository_roots() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("resfilter.toml"),
		r#"
local_repository = "/home/me/.m2/repository"

[properties]
"session.goal" = "from-properties"

[project]
version = "1.0.0"

[session]
goal = "package"
offline = false

[settings]
interactiveMode = true

[settings.proxy]
host = "proxy.local"
"#,
	)?;

	let output = common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.write_stdin(
			"${session.offline} ${settings.interactiveMode} @settings.proxy.host@ ${localRepository} \
			 ${session.goal} ${offline} ${version}",
		)
		.output()?;

	assert!(output.status.success());
	assert_eq!(
		String::from_utf8(output.stdout)?,
		"false true proxy.local /home/me/.m2/repository from-properties ${offline} 1.0.0"
	);

	Ok(())
}

#[rstest]
#[case::strip(&["--escape-string", "\\"], "\\${name}", "${name}")]
#[case::preserve(&["--escape-string", "\\", "--preserve-escape-string"], "\\${name}", "\\${name}")]
#[case::windows_paths(&["--escape-windows-paths"], "${dir}", "C:\\\\temp")]
#[case::raw_windows_paths(&[], "${dir}", "C:\\temp")]
#[case::multi_line(&["--multi-line"], "${multi\nline}", "joined")]
#[case::single_line(&[], "${multi\nline}", "${multi\nline}")]
fn engine_flags(#[case] flags: &[&str], #[case] input: &str, #[case] expected: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let output = common::resfilter_cmd()
		.arg("--path")
		.arg(tmp.path())
		.args(["-D", "name=world", "-D", "dir=C:\\temp", "-D", "multi\nline=joined"])
		.args(flags)
		.write_stdin(input)
		.output()?;

	assert!(output.status.success());
	assert_eq!(String::from_utf8(output.stdout)?, expected);

	Ok(())
}
