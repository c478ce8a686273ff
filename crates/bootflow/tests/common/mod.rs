use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A state directory with certificate files and terraform templates
pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("cert.pem"), "some-cert").unwrap();
        fs::write(root.path().join("key.pem"), "some-key").unwrap();
        fs::create_dir(root.path().join("templates")).unwrap();
        fs::write(root.path().join("templates/main.tf"), "# lbs").unwrap();
        Self { root }
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    pub fn write_state(&self, state: serde_json::Value) {
        fs::write(
            self.file("bootflow-state.json"),
            serde_json::to_string_pretty(&state).unwrap(),
        )
        .unwrap();
    }

    pub fn state(&self) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(self.file("bootflow-state.json")).unwrap())
            .unwrap()
    }

    /// An AWS environment without a director
    pub fn aws_state(&self) -> serde_json::Value {
        serde_json::json!({
            "version": 1,
            "envId": "some-env",
            "iaas": "aws",
            "noDirector": true,
            "aws": {
                "accessKeyId": "some-access-key",
                "secretAccessKey": "some-secret-key",
                "region": "us-east-1"
            }
        })
    }

    /// Writes an executable shell script and returns its path.
    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.file(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
