// Models, envelopes and handlers spread over several files and directories
use apidocs_from_source::config::GeneratorConfig;
use apidocs_from_source::listing::generate_listing;
use apidocs_from_source::source::SourceSet;
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, path: &str, content: &str) {
    let path = dir.path().join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_cross_file_type_resolution() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "src/handlers/users.rs",
        r#"
        use crate::models::User;

        /// Get a user
        #[get("/users/{id}")]
        pub async fn get_user(id: Path<u32>) -> Json<Envelope<User>> { todo!() }
    "#,
    );
    write(
        &dir,
        "src/models/mod.rs",
        r#"
        pub mod user;

        pub mod shared {
            /// Generic response wrapper
            pub struct Envelope<T> { pub content: T, pub status: Status }
            pub enum Status { Ok, Failed }
        }
    "#,
    );
    write(
        &dir,
        "src/models/user.rs",
        r#"
        /// A registered user
        pub struct User { pub id: u32, pub profile: Profile }
        pub struct Profile { pub email: String }
    "#,
    );
    // Build output and hidden directories are never read
    write(&dir, "target/debug/build/out.rs", "pub struct User { pub broken: u8 }");
    write(&dir, ".cache/gen.rs", "pub struct Profile { pub broken: u8 }");
    // Unparseable files are reported and skipped
    write(&dir, "src/broken.rs", "pub struct {");

    let config = GeneratorConfig::from_yaml(
        r#"
conventions:
  envelopes:
    - name: Envelope
"#,
    )
    .unwrap();
    let sources = SourceSet::load(dir.path(), &config.exclude_dirs).unwrap();
    assert_eq!(sources.files.len(), 3);
    assert_eq!(sources.warnings.len(), 1);
    assert!(sources.warnings[0].contains("broken.rs"));

    let generated = generate_listing(&sources.files, &config);
    assert!(generated.failures.is_empty());

    let operation = &generated.listing.apis[0].operations[0];
    assert_eq!(operation.response_type, "envelope<user>");

    let models = &generated.listing.models;
    assert_eq!(
        models.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["envelope<user>", "profile", "status", "user"]
    );
    assert_eq!(models["user"].description.as_deref(), Some("A registered user"));
    assert_eq!(
        models["envelope<user>"].description.as_deref(),
        Some("Generic response wrapper")
    );
    assert!(models["user"].properties.contains("profile"));
    assert!(!models["profile"].properties.contains("broken"));
}
