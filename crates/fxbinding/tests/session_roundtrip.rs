use std::fs;
use std::path::Path;

use fxbinding::{FieldValue, Session, SessionError};
use inistore::ConfigError;
use tempfile::TempDir;

const BLOOM_FX: &str = r#"
#define MAX_STR 2.0

uniform float Strength <
    ui_type = "slider";
    ui_label = "Bloom Strength";
    ui_min = 0.0; ui_max = MAX_STR;
> = 0.5;

uniform int MaxRadius < ui_type = "drag"; ui_min = 1; ui_max = 32; > = 8;
uniform bool Enabled < > = true;
uniform int Mode < ui_type = "combo"; ui_items = "Soft\0Hard\0"; > = 0;
"#;

const PRESET: &str = "KeyReload=82\nTechniques=Bloom@Bloom.fx,Vignette@Vignette.fx\n\n[Bloom.fx]\nStrength=1.25\nMaxRadius=16\nEnabled=0\nMode=1\nUnrelated=keep me\n\n[Vignette.fx]\nAmount=0.3\n";

fn write_shader(dir: &Path) -> std::path::PathBuf {
    let shader = dir.join("Bloom.fx");
    fs::write(&shader, BLOOM_FX).unwrap();
    shader
}

#[test]
fn loads_edits_and_saves_sibling_preset() {
    let root = TempDir::new().unwrap();
    let shader = write_shader(root.path());
    let preset = root.path().join("Bloom_preset.ini");
    fs::write(&preset, PRESET).unwrap();

    let mut session = Session::open(&shader).expect("open shader");
    assert_eq!(session.section(), "Bloom.fx");
    assert_eq!(session.schema()[0].meta("ui_max"), Some("2.0"));

    let report = session.last_load().expect("sibling preset loaded on open");
    assert_eq!(report.path, preset);
    assert_eq!(session.config_path(), Some(preset.as_path()));
    assert!(!report.new_file);
    assert!(report.failures.is_empty());
    assert_eq!(session.values()["Strength"], FieldValue::Float(1.25));
    assert_eq!(session.values()["MaxRadius"], FieldValue::Int(16));
    assert_eq!(session.values()["Enabled"], FieldValue::Bool(false));
    assert_eq!(session.values()["Mode"], FieldValue::Choice(1));

    assert!(session.set_value("Strength", FieldValue::Float(1.75)));
    assert!(session.set_value("Enabled", FieldValue::Bool(true)));
    session.save().expect("save preset");

    let written = fs::read_to_string(&preset).unwrap();
    assert_eq!(
        written,
        "KeyReload=82\nTechniques=Bloom@Bloom.fx,Vignette@Vignette.fx\n\n[Bloom.fx]\nStrength=1.75\nMaxRadius=16\nEnabled=1\nMode=1\nUnrelated=keep me\n\n[Vignette.fx]\nAmount=0.3\n"
    );
}

#[test]
fn open_keeps_shader_when_sibling_preset_is_broken() {
    let root = TempDir::new().unwrap();
    let shader = write_shader(root.path());
    fs::write(root.path().join("Bloom.ini"), "[Other.fx]\nAmount=1\n").unwrap();

    let session = Session::open(&shader).expect("open shader");
    assert!(session.config_path().is_none());
    assert!(session.last_load().is_none());
    assert_eq!(session.values()["Strength"], FieldValue::Float(0.5));
}

#[test]
fn open_shader_skips_sibling_preset() {
    let root = TempDir::new().unwrap();
    let shader = write_shader(root.path());
    fs::write(root.path().join("Bloom.ini"), PRESET).unwrap();

    let session = Session::open_shader(&shader).expect("open shader");
    assert!(session.config_path().is_none());
    assert_eq!(session.values()["Strength"], FieldValue::Float(0.5));
}

#[test]
fn wrong_kind_values_are_not_saved() {
    let root = TempDir::new().unwrap();
    let shader = write_shader(root.path());
    let preset = root.path().join("Bloom.ini");
    fs::write(&preset, PRESET).unwrap();

    let mut session = Session::open(&shader).expect("open shader");
    assert!(!session.set_value("MaxRadius", FieldValue::Float(2.5)));
    session
        .values_mut()
        .insert("MaxRadius".into(), FieldValue::Float(2.5));
    session.save().expect("save preset");

    let reopened = Session::open(&shader).expect("reopen shader");
    assert_eq!(reopened.values()["MaxRadius"], FieldValue::Int(16));
    assert!(fs::read_to_string(&preset).unwrap().contains("MaxRadius=16\n"));
}

#[test]
fn layout_mismatch_leaves_values_untouched() {
    let root = TempDir::new().unwrap();
    let shader = write_shader(root.path());
    let preset = root.path().join("Bloom.ini");
    fs::write(&preset, "[Bloom.fx]\nstrength=1.0\n").unwrap();

    let mut session = Session::open(&shader).expect("open shader");
    let err = session.load_config(&preset).unwrap_err();
    match err {
        SessionError::Layout(mismatch) => {
            assert_eq!(mismatch.missing, ["Enabled", "MaxRadius", "Mode"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.values()["Strength"], FieldValue::Float(0.5));
    assert!(session.config_path().is_none());
    assert!(matches!(session.save(), Err(SessionError::NoConfig)));
    assert_eq!(fs::read_to_string(&preset).unwrap(), "[Bloom.fx]\nstrength=1.0\n");
}

#[test]
fn duplicate_section_aborts_load() {
    let root = TempDir::new().unwrap();
    let shader = write_shader(root.path());
    let preset = root.path().join("Bloom.ini");
    fs::write(&preset, "[Bloom.fx]\nStrength=1\n\n[Bloom.fx]\nStrength=2\n").unwrap();

    let mut session = Session::open(&shader).expect("open shader");
    let err = session.autoload_config().unwrap_err();
    let cause = err.downcast_ref::<SessionError>().expect("session error");
    assert!(matches!(
        cause,
        SessionError::Config(ConfigError::DuplicateSection { name, .. }) if name == "Bloom.fx"
    ));
    assert!(session.store().is_none());
}

#[test]
fn normalized_keys_pass_check_but_fall_back_to_defaults() {
    let root = TempDir::new().unwrap();
    let shader = write_shader(root.path());
    let preset = root.path().join("Bloom.ini");
    fs::write(
        &preset,
        "[Bloom.fx]\nstrength=0.9\nmax_radius=4\nenabled=1\nmode=abc\n",
    )
    .unwrap();

    let mut session = Session::open(&shader).expect("open shader");
    let report = session.load_config(&preset).expect("compatible preset");
    assert_eq!(session.values()["Strength"], FieldValue::Float(0.9));
    assert_eq!(session.values()["MaxRadius"], FieldValue::Int(8));
    assert_eq!(session.values()["Mode"], FieldValue::Choice(0));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "Mode");
}

#[test]
fn missing_preset_is_created_on_save() {
    let root = TempDir::new().unwrap();
    let shader = write_shader(root.path());
    let preset = root.path().join("Bloom.ini");

    let mut session = Session::open(&shader).expect("open shader");
    assert!(session.autoload_config().expect("autoload").is_none());

    let report = session.load_config(&preset).expect("new preset");
    assert!(report.new_file);
    session.save().expect("save preset");

    assert_eq!(
        fs::read_to_string(&preset).unwrap(),
        "[Bloom.fx]\nStrength=0.5\nMaxRadius=8\nEnabled=1\nMode=0\n"
    );

    let mut reopened = Session::open(&shader).expect("reopen shader");
    let report = reopened
        .autoload_config()
        .expect("autoload")
        .expect("preset found");
    assert!(report.failures.is_empty());
    assert_eq!(reopened.values(), session.values());
}
