//! The `landmark init` command.

use anyhow::Result;

use landmark_core::catalog::REFERENCE_CATALOG;

pub fn execute() -> Result<()> {
    if std::path::Path::new("landmark.toml").exists() {
        println!("landmark.toml already exists, skipping.");
    } else {
        std::fs::write("landmark.toml", SAMPLE_CONFIG)?;
        println!("Created landmark.toml");
    }

    std::fs::create_dir_all("catalogs")?;
    let catalog_path = std::path::Path::new("catalogs/neck.toml");
    if catalog_path.exists() {
        println!("catalogs/neck.toml already exists, skipping.");
    } else {
        std::fs::write(catalog_path, REFERENCE_CATALOG)?;
        println!("Created catalogs/neck.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set upload_url in landmark.toml");
    println!("     and export LANDMARK_SESSION_CODE and LANDMARK_AUTH_TOKEN");
    println!("  2. Run: landmark validate --catalog catalogs/neck.toml");
    println!("  3. Run: landmark run --script session.txt");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# landmark configuration

package_name = "com.cavelabspesurr.chestsounds"
# questions_url = "https://example.org/functions/v1/questions"

# Reports are kept locally unless an upload endpoint is set.
# upload_url = "https://example.org/functions/v1/results"
session_code = "${LANDMARK_SESSION_CODE}"
auth_token = "${LANDMARK_AUTH_TOKEN}"

request_timeout_secs = 10
teardown_delay_secs = 5.0
catalog = "catalogs/neck.toml"
"#;
