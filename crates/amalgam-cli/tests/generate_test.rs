//! Regenerating the robotstxt single-header distribution from a fixture tree

use amalgam_core::provenance::without_provenance;
use amalgam_core::Provenance;
use amalgamate::{Generator, Manifest, Staleness};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ROBOTS_H: &str = "// Copyright 1999 Google LLC
//
// Licensed under the Apache License, Version 2.0

#ifndef THIRD_PARTY_ROBOTSTXT_ROBOTS_H__
#define THIRD_PARTY_ROBOTSTXT_ROBOTS_H__

#include <string_view>

#ifndef ROBOTS_SUPPORT_CONTENT_SIGNAL
#define ROBOTS_SUPPORT_CONTENT_SIGNAL 1
#endif

namespace googlebot {
bool Allowed(std::string_view url);
}  // namespace googlebot
#endif  // THIRD_PARTY_ROBOTSTXT_ROBOTS_H__
";

const ROBOTS_CC: &str = "// Copyright 1999 Google LLC
//
// Licensed under the Apache License, Version 2.0

#include \"robots.h\"

#include <string>

namespace googlebot {
bool Allowed(std::string_view url) { return !url.empty(); }
}  // namespace googlebot
";

const ROBOTS_C_H: &str = "// Copyright 1999 Google LLC
//
// C API for the robots.txt parser and matcher library.

#ifndef ROBOTS_C_H
#define ROBOTS_C_H

#include <stdbool.h>

#ifdef __cplusplus
extern \"C\" {
#endif

bool robots_allowed(const char* url);

#ifdef __cplusplus
}
#endif

#endif  // ROBOTS_C_H
";

const ROBOTS_C_CC: &str = "// Copyright 1999 Google LLC

#include \"robots_c.h\"
#include \"robots.h\"

extern \"C\" bool robots_allowed(const char* url) {
  return googlebot::Allowed(url);
}
";

const REPORTING_H: &str = "// Copyright 2019 Google LLC

#ifndef THIRD_PARTY_ROBOTSTXT_REPORTING_ROBOTS_H_
#define THIRD_PARTY_ROBOTSTXT_REPORTING_ROBOTS_H_

#include \"robots.h\"

namespace googlebot {
class RobotsParsingReporter {};
}  // namespace googlebot
#endif  // THIRD_PARTY_ROBOTSTXT_REPORTING_ROBOTS_H_
";

const REPORTING_CC: &str = "// Copyright 2019 Google LLC

#include \"reporting_robots.h\"

namespace googlebot {
}  // namespace googlebot
";

fn write_fixture(root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(root.join("bindings/c"))?;
    fs::write(root.join("robots.h"), ROBOTS_H)?;
    fs::write(root.join("robots.cc"), ROBOTS_CC)?;
    fs::write(root.join("bindings/c/robots_c.h"), ROBOTS_C_H)?;
    fs::write(root.join("bindings/c/robots_c.cc"), ROBOTS_C_CC)?;
    fs::write(root.join("reporting_robots.h"), REPORTING_H)?;
    fs::write(root.join("reporting_robots.cc"), REPORTING_CC)?;
    Ok(())
}

fn provenance() -> Provenance {
    Provenance::new(Some("0e413cb".to_string()), "2026-01-16 23:01:33 +0200")
}

#[test]
fn test_regenerates_every_artifact() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_fixture(root)?;

    let manifest = Manifest::load(root, None)?;
    let provenance = provenance();
    let artifacts = Generator::new(root, &manifest, &provenance).run()?;
    assert_eq!(artifacts.len(), 3);

    let out = root.join("singleheader");
    let robots = fs::read_to_string(out.join("robots.h"))?;
    let robots_c = fs::read_to_string(out.join("robots_c.h"))?;
    let reporting = fs::read_to_string(out.join("reporting_robots.h"))?;

    assert!(robots.starts_with(
        "// Copyright 1999 Google LLC\n//\n// Licensed under the Apache License, Version 2.0\n\n//\n// *** AMALGAMATED SINGLE-HEADER VERSION ***\n"
    ));
    assert!(robots.contains("#ifdef ROBOTS_IMPLEMENTATION\n\n#include <string>\n"));
    assert!(!robots.contains("#include \"robots.h\""));

    assert!(robots_c.contains("#ifdef __cplusplus\n// === Begin embedded robots.h (C++ only) ===\n"));
    assert!(robots_c.contains("#if defined(ROBOTS_IMPLEMENTATION) && defined(__cplusplus)"));
    assert!(robots_c.contains("// === Begin robots_c.cc implementation ===\nextern \"C\" bool"));
    assert!(robots_c.ends_with("#endif  // ROBOTS_C_H\n"));
    assert!(!robots_c.contains("THIRD_PARTY_ROBOTSTXT_ROBOTS_H__"));

    assert!(reporting.contains(
        "#define THIRD_PARTY_ROBOTSTXT_REPORTING_ROBOTS_H_\n\n// === Begin embedded robots.h ===\n"
    ));
    assert!(!reporting.contains("#include \"robots.h\""));
    assert!(!reporting.contains("#include \"reporting_robots.h\""));
    Ok(())
}

#[test]
fn test_missing_closing_guard_writes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_fixture(root)?;
    fs::write(
        root.join("bindings/c/robots_c.h"),
        ROBOTS_C_H.replace("#endif  // ROBOTS_C_H\n", ""),
    )?;

    // A stale artifact from an earlier run must survive untouched.
    let out = root.join("singleheader");
    fs::create_dir_all(&out)?;
    fs::write(out.join("robots_c.h"), "stale\n")?;

    let manifest = Manifest::default();
    let provenance = provenance();
    let err = Generator::new(root, &manifest, &provenance)
        .run()
        .expect_err("generation must abort");
    let message = format!("{:#}", err);

    assert!(message.contains("robots_c.h"), "{}", message);
    assert!(message.contains("ROBOTS_C_H"), "{}", message);
    assert_eq!(fs::read_to_string(out.join("robots_c.h"))?, "stale\n");
    // robots.h renders fine but the run is all-or-nothing.
    assert!(!out.join("robots.h").exists());
    assert!(!out.join("reporting_robots.h").exists());
    Ok(())
}

#[test]
fn test_missing_input_names_the_path() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_fixture(root)?;
    fs::remove_file(root.join("reporting_robots.cc"))?;

    let manifest = Manifest::default();
    let provenance = provenance();
    let err = Generator::new(root, &manifest, &provenance)
        .render_all()
        .expect_err("missing source must fail");
    assert!(format!("{:#}", err).contains("reporting_robots.cc"));
    Ok(())
}

#[test]
fn test_rerun_is_stable_modulo_provenance() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_fixture(root)?;
    let manifest = Manifest::default();

    let first = provenance();
    let first_run = Generator::new(root, &manifest, &first).run()?;

    let second = Provenance::new(None, "2026-10-14 09:30:00");
    let generator = Generator::new(root, &manifest, &second);
    let second_run = generator.render_all()?;
    assert!(generator.check(&second_run)?.is_empty());

    for (a, b) in first_run.iter().zip(&second_run) {
        assert_ne!(a.content, b.content);
        assert_eq!(without_provenance(&a.content), without_provenance(&b.content));
    }
    Ok(())
}

#[test]
fn test_check_reports_missing_and_edited_artifacts() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_fixture(root)?;
    let manifest = Manifest::default();
    let provenance = provenance();
    let generator = Generator::new(root, &manifest, &provenance);

    let artifacts = generator.run()?;
    let out = root.join("singleheader");
    fs::remove_file(out.join("robots.h"))?;
    fs::write(out.join("reporting_robots.h"), "// hand edited\n")?;

    let stale = generator.check(&artifacts)?;
    let summary: Vec<(&str, &Staleness)> = stale
        .iter()
        .map(|s| (s.name.as_str(), &s.staleness))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("robots.h", &Staleness::Missing),
            ("reporting_robots.h", &Staleness::Differs)
        ]
    );
    Ok(())
}

#[test]
fn test_manifest_file_overrides_builtin_targets() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write_fixture(root)?;
    fs::write(
        root.join("amalgamate.toml"),
        r#"
[settings]
output_dir = "dist"
switch = "GOOGLEBOT_IMPLEMENTATION"
regenerate_command = "cargo run -p amalgamate"

[[targets]]
kind = "single"
output = "googlebot.h"
module = { header = "robots.h", source = "robots.cc" }
"#,
    )?;

    let manifest = Manifest::load(root, None)?;
    let provenance = provenance();
    let artifacts = Generator::new(root, &manifest, &provenance).run()?;

    assert_eq!(artifacts.len(), 1);
    let content = fs::read_to_string(root.join("dist/googlebot.h"))?;
    assert!(content.contains("//   #include \"googlebot.h\""));
    assert!(content.contains("#ifdef GOOGLEBOT_IMPLEMENTATION"));
    assert!(content.contains("// Run: cargo run -p amalgamate"));
    assert!(!root.join("singleheader").exists());
    Ok(())
}
