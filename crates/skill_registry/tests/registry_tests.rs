use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use glam::DVec3;
use layout_types::{ArgValue, Layout, RelationArgs};
use skill_registry::{
    InMemorySkillStore, JsonFileSkillStore, RegistryError, SkillOrigin, SkillRegistry, SkillStore,
    SourceMap, StoreError,
};
use spatial_skills::{Arity, Skill};

const CLOSE_PROXIMITY: &str = "skill proximity(a, b; min_dist = 1.0, max_dist = 5.0) {
    if distance(a.location, b.location) <= max_dist { 1.0 } else { 0.0 }
}";

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "skill_registry_{label}_{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ))
}

fn memory_registry() -> (SkillRegistry, Arc<InMemorySkillStore>) {
    let store = Arc::new(InMemorySkillStore::new());
    let registry = SkillRegistry::open(store.clone()).expect("registry");
    (registry, store)
}

fn scene() -> Vec<Layout> {
    vec![
        Layout::at(DVec3::new(0.0, 0.0, 0.0)).with_orientation(DVec3::new(0.0, 10.0, 0.0)),
        Layout::at(DVec3::new(3.0, 1.0, 0.0)).with_orientation(DVec3::new(15.0, 95.0, 0.0)),
        Layout::at(DVec3::new(-2.5, 0.5, 1.0)).with_orientation(DVec3::new(0.0, 200.0, 30.0)),
    ]
}

fn args_for(name: &str) -> RelationArgs {
    let mut args = RelationArgs::new();
    match name {
        "alignment" | "symmetry" => {
            args.insert("axis".into(), ArgValue::from("x"));
        }
        "proximity" => {
            args.insert("max_dist".into(), ArgValue::Number(4.0));
        }
        _ => {}
    }
    args
}

#[derive(Debug)]
struct BrokenStore;

impl SkillStore for BrokenStore {
    fn load(&self) -> Result<Option<SourceMap>, StoreError> {
        Err(StoreError::Io {
            path: "broken".into(),
            source: std::io::Error::other("disk unplugged"),
        })
    }

    fn save(&self, _sources: &SourceMap) -> Result<(), StoreError> {
        self.load().map(|_| ())
    }
}

#[test]
fn defaults_are_builtin_version_one() {
    let (registry, _) = memory_registry();
    let entries = registry.entries();
    assert_eq!(entries.len(), 5);
    assert!(entries
        .iter()
        .all(|e| e.version == 1 && e.origin == SkillOrigin::Builtin && e.digest.len() == 64));
    assert_eq!(registry.generation(), 0);
    assert!(registry.lookup("Proximity").is_some());
    assert!(registry.lookup("levitation").is_none());
}

#[test]
fn default_sources_recompile_to_identical_scorers() {
    let (registry, _) = memory_registry();
    let layouts = scene();
    for info in registry.entries() {
        let native = registry.lookup(&info.name).expect("native");
        let source = registry.source_of(&info.name).expect("source");
        let scripted = skill_script::compile(&source).expect("compile");

        let refs: Vec<&Layout> = match native.signature().arity {
            Arity::Exact(n) => layouts.iter().take(n).collect(),
            Arity::Variadic => layouts.iter().collect(),
        };
        let args = args_for(&info.name);
        assert_eq!(
            scripted.invoke(&refs, &args),
            native.invoke(&refs, &args),
            "{} diverged",
            info.name
        );
    }
}

#[test]
fn replace_installs_bumps_version_and_persists_everything() {
    let (registry, store) = memory_registry();
    let report = registry.replace("proximity", CLOSE_PROXIMITY).expect("replace");
    assert_eq!(report.version, 2);
    assert!(report.is_persisted());
    assert_eq!(registry.generation(), 1);
    assert_eq!(registry.source_of("proximity").as_deref(), Some(CLOSE_PROXIMITY));

    let a = Layout::default();
    let b = Layout::at(DVec3::new(4.0, 0.0, 0.0));
    let skill = registry.lookup("proximity").expect("skill");
    assert_eq!(skill.invoke(&[&a, &b], &RelationArgs::new()), Ok(1.0));

    let persisted = store.load().expect("load").expect("saved");
    assert_eq!(persisted.len(), 5);
    assert_eq!(persisted["proximity"], CLOSE_PROXIMITY);
    assert_eq!(
        persisted["alignment"],
        registry.source_of("alignment").expect("alignment")
    );
}

#[test]
fn failed_replace_keeps_previous_implementation() {
    let (registry, store) = memory_registry();
    let before = registry.source_of("proximity");

    let err = registry
        .replace("proximity", "skill proximity(a, b) { 1.0 +")
        .expect_err("syntax error");
    assert!(matches!(err, RegistryError::Compile { .. }));
    assert_eq!(
        registry.replace("proximity", "skill nearness(a, b) { 1.0 }").expect_err("mismatch"),
        RegistryError::NameMismatch {
            expected: "proximity".into(),
            found: "nearness".into()
        }
    );
    assert_eq!(
        registry.replace("Bad-Name", "skill x(a) { 1 }").expect_err("name"),
        RegistryError::InvalidName("Bad-Name".into())
    );

    assert_eq!(registry.source_of("proximity"), before);
    assert_eq!(registry.generation(), 0);
    assert!(store.load().expect("load").is_none());
}

#[test]
fn new_relation_types_can_be_added() {
    let (registry, _) = memory_registry();
    let source = "skill stacked(a, b) { if a.location.z > b.location.z { 1 } else { 0 } }";
    let report = registry.replace("stacked", source).expect("replace");
    assert_eq!(report.version, 1);
    let top = Layout::at(DVec3::new(0.0, 0.0, 2.0));
    let bottom = Layout::default();
    let skill = registry.lookup("stacked").expect("skill");
    assert_eq!(skill.invoke(&[&top, &bottom], &RelationArgs::new()), Ok(1.0));
    assert_eq!(registry.entries().len(), 6);
}

#[test]
fn persistence_failure_is_reported_without_rollback() {
    let registry = SkillRegistry::open(Arc::new(BrokenStore)).expect("defaults survive");
    assert_eq!(registry.generation(), 0);

    let report = registry.replace("proximity", CLOSE_PROXIMITY).expect("replace");
    assert!(!report.is_persisted());
    assert_eq!(registry.source_of("proximity").as_deref(), Some(CLOSE_PROXIMITY));
}

#[test]
fn replaced_skills_survive_restart() {
    let dir = temp_path("restart");
    let path = dir.join("skills_database.json");
    {
        let registry =
            SkillRegistry::open(Arc::new(JsonFileSkillStore::new(&path))).expect("open");
        registry.replace("proximity", CLOSE_PROXIMITY).expect("replace");
    }
    {
        let registry =
            SkillRegistry::open(Arc::new(JsonFileSkillStore::new(&path))).expect("reopen");
        assert_eq!(registry.source_of("proximity").as_deref(), Some(CLOSE_PROXIMITY));
        let entries = registry.entries();
        let proximity = entries.iter().find(|e| e.name == "proximity").expect("entry");
        assert_eq!(proximity.origin, SkillOrigin::Stored);
        let alignment = entries.iter().find(|e| e.name == "alignment").expect("entry");
        assert_eq!(alignment.origin, SkillOrigin::Builtin);
    }
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn broken_stored_entries_keep_their_defaults() {
    let mut sources = SourceMap::new();
    sources.insert("proximity".into(), "not a skill".into());
    sources.insert("alignment".into(), "skill symmetry(xs...) { 1 }".into());
    let store = Arc::new(InMemorySkillStore::with_sources(sources));
    let registry = SkillRegistry::with_defaults(store).expect("defaults");
    let default_proximity = registry.source_of("proximity");

    let report = registry.load_from_store();
    assert!(report.installed.is_empty());
    assert_eq!(report.rejected.len(), 2);
    assert_eq!(registry.source_of("proximity"), default_proximity);
    assert_eq!(registry.generation(), 0);
}

#[test]
fn deeply_nested_sources_are_rejected_at_replace_and_startup() {
    let nested = format!(
        "skill proximity(a, b) {{ {}1{} }}",
        "(".repeat(20_000),
        ")".repeat(20_000)
    );
    let (registry, _) = memory_registry();
    let before = registry.source_of("proximity");
    assert!(matches!(
        registry.replace("proximity", &nested),
        Err(RegistryError::Compile { .. })
    ));
    assert_eq!(registry.source_of("proximity"), before);

    let mut sources = SourceMap::new();
    sources.insert("proximity".into(), nested);
    let store = Arc::new(InMemorySkillStore::with_sources(sources));
    let registry = SkillRegistry::open(store).expect("defaults survive");
    let proximity = registry
        .entries()
        .into_iter()
        .find(|e| e.name == "proximity")
        .expect("entry");
    assert_eq!(proximity.origin, SkillOrigin::Builtin);
}

#[test]
fn lookups_never_fail_while_replacing() {
    let (registry, _) = memory_registry();
    let rounds = 20;
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..200 {
                    let skill = registry.lookup("proximity").expect("always installed");
                    assert_eq!(skill.name(), "proximity");
                }
            });
        }
        scope.spawn(|| {
            for _ in 0..rounds {
                registry.replace("proximity", CLOSE_PROXIMITY).expect("replace");
            }
        });
    });
    let entries = registry.entries();
    let proximity = entries.iter().find(|e| e.name == "proximity").expect("entry");
    assert_eq!(proximity.version, 1 + rounds);
    assert_eq!(registry.generation(), rounds);
}
