use super::*;

#[test]
fn version_parse_strips_go_prefix_and_whitespace() {
    let version = VersionId::parse(" go1.22.0 ").expect("version should parse");
    assert_eq!(version.as_str(), "1.22.0");
    assert_eq!(version.to_string(), "1.22.0");

    let bare = VersionId::parse("1.21rc2").expect("version should parse");
    assert_eq!(bare.as_str(), "1.21rc2");
}

#[test]
fn version_parse_rejects_empty_and_path_like_input() {
    for raw in ["", "   ", "go", "..", "1.22/../..", "1.22\\x", "1.22 0"] {
        let err = VersionId::parse(raw).expect_err("malformed version must be rejected");
        assert!(
            matches!(err, VgError::InvalidVersion(_)),
            "unexpected error for {raw:?}: {err}"
        );
    }
}

#[test]
fn version_semver_mapping_handles_go_release_names() {
    let cases = [
        ("1.22.0", "1.22.0"),
        ("1.22", "1.22.0"),
        ("1.21rc2", "1.21.0-rc.2"),
        ("1.20beta1", "1.20.0-beta.1"),
        ("1", "1.0.0"),
    ];
    for (raw, expected) in cases {
        let version = VersionId::parse(raw).expect("version should parse");
        assert_eq!(
            version.semver().map(|v| v.to_string()).as_deref(),
            Some(expected),
            "mapping for {raw}"
        );
    }

    let odd = VersionId::parse("tip").expect("version should parse");
    assert!(odd.semver().is_none());
}

#[test]
fn version_ordering_is_numeric_with_prereleases_first() {
    let mut versions = ["1.9.2", "tip", "1.22.0", "1.21rc2", "1.21.0", "1.10.1"]
        .iter()
        .map(|raw| VersionId::parse(raw).expect("version should parse"))
        .collect::<Vec<_>>();
    versions.sort();

    let rendered = versions.iter().map(VersionId::as_str).collect::<Vec<_>>();
    assert_eq!(
        rendered,
        vec!["1.9.2", "1.10.1", "1.21rc2", "1.21.0", "1.22.0", "tip"]
    );
}

#[test]
fn env_name_rejects_reserved_and_path_like_names() {
    assert_eq!(
        EnvName::parse("work").expect("name should parse").as_str(),
        "work"
    );
    for raw in ["", ".", "..", ".staging", "a/b", "a\\b", "two words"] {
        let err = EnvName::parse(raw).expect_err("malformed name must be rejected");
        assert!(matches!(err, VgError::InvalidEnvName(_)));
    }
}

#[test]
fn activation_links_map_to_fixed_file_names() {
    let names = ActivationLink::ALL
        .iter()
        .map(|link| link.file_name())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["current", "current-gopath", "current-gocache", "current-goenv"]
    );
    assert!(!ActivationLink::AUXILIARY.contains(&ActivationLink::Version));
    assert!(ActivationLink::Settings.targets_file());
    assert_eq!(ActivationLink::Workspace.env_var(), "GOPATH");
}

#[test]
fn active_context_exposes_version_and_environment() {
    let version = VersionId::parse("1.22.0").expect("version should parse");
    let name = EnvName::parse("work").expect("name should parse");

    let global = ActiveContext::Global {
        version: version.clone(),
    };
    assert_eq!(global.version(), &version);
    assert!(global.environment().is_none());
    assert_eq!(global.to_string(), "Go 1.22.0 (global)");

    let scoped = ActiveContext::Scoped {
        version: version.clone(),
        name: name.clone(),
    };
    assert!(scoped.is_scoped());
    assert_eq!(scoped.environment(), Some(&name));
    assert_eq!(scoped.to_string(), "Go 1.22.0 (env work)");
}

#[test]
fn config_defaults_when_sections_missing() {
    let config = VgConfig::from_toml_str("").expect("empty config should parse");
    assert_eq!(config, VgConfig::default());
    assert_eq!(config.install.auto_install, AutoInstallPolicy::Prompt);
    assert_eq!(config.install.mirror, DEFAULT_MIRROR);
    assert!(config.install.verify_checksum);
}

#[test]
fn config_parses_install_section() {
    let content = r#"
[install]
auto_install = "never"
mirror = "https://mirror.example.test/go/"
verify_checksum = false
"#;
    let config = VgConfig::from_toml_str(content).expect("config should parse");
    assert_eq!(config.install.auto_install, AutoInstallPolicy::Never);
    assert_eq!(config.install.mirror, "https://mirror.example.test/go/");
    assert!(!config.install.verify_checksum);
}

#[test]
fn config_rejects_unknown_keys_and_empty_mirror() {
    assert!(VgConfig::from_toml_str("[install]\nauto = true\n").is_err());
    assert!(VgConfig::from_toml_str("[install]\nmirror = \"  \"\n").is_err());
}

#[test]
fn archive_type_inference_from_filename() {
    assert_eq!(
        ArchiveType::infer_from_filename("go1.22.0.linux-amd64.tar.gz"),
        Some(ArchiveType::TarGz)
    );
    assert_eq!(
        ArchiveType::infer_from_filename("go1.22.0.windows-amd64.zip?download=1"),
        Some(ArchiveType::Zip)
    );
    assert_eq!(ArchiveType::infer_from_filename("go1.22.0.darwin-arm64.pkg"), None);
    assert_eq!(ArchiveType::for_goos("windows"), ArchiveType::Zip);
    assert_eq!(ArchiveType::for_goos("linux"), ArchiveType::TarGz);
    assert_eq!(ArchiveType::for_goos("darwin").as_str(), "tar.gz");
}
