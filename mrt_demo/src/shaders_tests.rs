use super::*;

// ============================================================================
// DIRECTORY RESOLUTION
// ============================================================================

#[test]
fn test_default_dir_is_crate_shaders() {
    let dir = shader_dir(None);
    assert!(dir.ends_with("shaders"));
    assert!(dir.starts_with(env!("CARGO_MANIFEST_DIR")));
}

#[test]
fn test_empty_override_uses_default() {
    assert_eq!(shader_dir(Some("")), shader_dir(None));
}

#[test]
fn test_override_dir() {
    assert_eq!(shader_dir(Some("/opt/mrt/spv")), PathBuf::from("/opt/mrt/spv"));
}

// ============================================================================
// LOADING
// ============================================================================

#[test]
fn test_missing_file_names_the_path() {
    let dir = Path::new("/nonexistent/mrt-shaders");
    let err = match load_shader_sources(dir) {
        Err(e) => e,
        Ok(_) => panic!("loading from a missing directory must fail"),
    };
    match err {
        Error::InitializationFailed(msg) => {
            assert!(msg.contains("offscreen.vert.spv"), "unexpected message: {msg}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_loads_both_programs() {
    let dir = std::env::temp_dir().join(format!("mrt-demo-shaders-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    // SPIR-V magic followed by one padding word
    let module: Vec<u8> = [0x0723_0203u32, 0].iter().flat_map(|w| w.to_le_bytes()).collect();
    for file in ["offscreen.vert.spv", "offscreen.frag.spv", "quad.vert.spv", "quad.frag.spv"] {
        std::fs::write(dir.join(file), &module).unwrap();
    }

    let sources = load_shader_sources(&dir).unwrap();
    assert_eq!(sources.offscreen.name, "offscreen");
    assert_eq!(sources.quad.name, "quad");
    assert_eq!(sources.quad.fragment.code, module);

    std::fs::remove_dir_all(&dir).unwrap();
}
