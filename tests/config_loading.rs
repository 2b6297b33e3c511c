use codeloom::config::ConfigLoader;
use std::env;
use std::io::Write;
use tempfile::Builder;

#[test]
#[serial_test::serial]
fn environment_takes_precedence_over_an_explicit_file_which_takes_precedence_over_defaults() {
    unsafe {
        env::set_var("CODELOOM__CODE_ANALYSIS__VECTOR_DIM", "512");
    }

    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[code_analysis]
vector_dim = 256
min_chunk_length = 10
"#
    )
    .unwrap();

    let loader = ConfigLoader::new();
    let config = loader.load_with_file(file.path()).unwrap();

    unsafe {
        env::remove_var("CODELOOM__CODE_ANALYSIS__VECTOR_DIM");
    }

    assert_eq!(config.code_analysis.vector_dim, 512); // env wins
    assert_eq!(config.code_analysis.min_chunk_length, 10); // file wins over the embedded default
}

#[test]
#[serial_test::serial]
fn a_file_layer_overrides_the_embedded_default_when_no_env_var_is_set() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[code_analysis]
min_chunk_length = 5
"#
    )
    .unwrap();

    let config = ConfigLoader::new().load_with_file(file.path()).unwrap();
    assert_eq!(config.code_analysis.min_chunk_length, 5);
}
