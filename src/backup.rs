use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::db::DB_FILE;

const MANIFEST_ENTRY: &str = "manifest.json";
const DB_ENTRY: &str = "db/educore.sqlite3";
pub const BUNDLE_FORMAT: &str = "educore-workspace-v1";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: &'static str,
    pub entry_count: usize,
    pub sha256: String,
}

/// A bundle whose database entry matched its manifest checksum.
#[derive(Debug, Clone)]
pub struct VerifiedBundle {
    pub bundle_format: String,
    pub sha256: String,
    db_bytes: Vec<u8>,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn export_workspace_bundle(
    workspace_path: &Path,
    out_path: &Path,
) -> anyhow::Result<ExportSummary> {
    let db_path = workspace_path.join(DB_FILE);
    let db_bytes = std::fs::read(&db_path).with_context(|| {
        format!(
            "workspace database not readable: {}",
            db_path.to_string_lossy()
        )
    })?;
    let sha256 = sha256_hex(&db_bytes);

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = json!({
        "format": BUNDLE_FORMAT,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": crate::clock::stamp_text(crate::clock::now()),
        "dbEntry": DB_ENTRY,
        "sha256": sha256,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(DB_ENTRY, opts)
        .context("failed to start database entry")?;
    zip.write_all(&db_bytes)
        .context("failed to write database entry")?;
    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT,
        entry_count: 2,
        sha256,
    })
}

/// Read a bundle and check its database entry against the manifest.
/// Touches nothing on disk besides the bundle itself.
pub fn verify_workspace_bundle(in_path: &Path) -> anyhow::Result<VerifiedBundle> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }
    let expected = manifest
        .get("sha256")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("manifest.json has no sha256"))?
        .to_string();

    let mut db_bytes = Vec::new();
    archive
        .by_name(DB_ENTRY)
        .context("bundle missing db/educore.sqlite3")?
        .read_to_end(&mut db_bytes)
        .context("failed to extract database entry")?;
    let actual = sha256_hex(&db_bytes);
    if actual != expected {
        return Err(anyhow!(
            "checksum mismatch: manifest {} but database entry is {}",
            expected,
            actual
        ));
    }

    Ok(VerifiedBundle {
        bundle_format: format.to_string(),
        sha256: actual,
        db_bytes,
    })
}

/// Write a verified bundle's database into `workspace_path`, replacing the
/// existing file with a rename once the copy is fully written.
pub fn install_workspace_bundle(
    bundle: &VerifiedBundle,
    workspace_path: &Path,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(workspace_path).with_context(|| {
        format!(
            "failed to create workspace {}",
            workspace_path.to_string_lossy()
        )
    })?;
    let dst = workspace_path.join(DB_FILE);
    let tmp_dst = workspace_path.join(format!("{DB_FILE}.importing"));
    {
        let mut db_out = File::create(&tmp_dst).with_context(|| {
            format!(
                "failed to create temp database {}",
                tmp_dst.to_string_lossy()
            )
        })?;
        db_out
            .write_all(&bundle.db_bytes)
            .context("failed to write extracted database")?;
        db_out
            .flush()
            .context("failed to flush extracted database")?;
    }
    std::fs::rename(&tmp_dst, &dst).with_context(|| {
        format!(
            "failed to move extracted database to {}",
            dst.to_string_lossy()
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("educored-backup-{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    #[test]
    fn export_then_import_restores_database_bytes() {
        let src = temp_dir("src");
        drop(crate::db::open_db(&src).expect("open"));
        let bundle = src.join("out/backup.zip");
        let exported = export_workspace_bundle(&src, &bundle).expect("export");
        assert_eq!(exported.entry_count, 2);

        let dst = temp_dir("dst");
        let verified = verify_workspace_bundle(&bundle).expect("verify");
        assert_eq!(verified.sha256, exported.sha256);
        install_workspace_bundle(&verified, &dst).expect("install");
        assert_eq!(
            std::fs::read(dst.join(DB_FILE)).expect("read"),
            std::fs::read(src.join(DB_FILE)).expect("read")
        );
        let _ = std::fs::remove_dir_all(&src);
        let _ = std::fs::remove_dir_all(&dst);
    }

    #[test]
    fn tampered_checksum_is_rejected() {
        let dir = temp_dir("tamper");
        let bundle = dir.join("bad.zip");
        {
            let mut zip = ZipWriter::new(File::create(&bundle).expect("create"));
            let opts = FileOptions::default();
            zip.start_file(MANIFEST_ENTRY, opts).expect("manifest");
            zip.write_all(
                json!({ "format": BUNDLE_FORMAT, "sha256": "00" })
                    .to_string()
                    .as_bytes(),
            )
            .expect("write");
            zip.start_file(DB_ENTRY, opts).expect("db");
            zip.write_all(b"not a database").expect("write");
            zip.finish().expect("finish");
        }
        let err = verify_workspace_bundle(&bundle).expect_err("mismatch");
        assert!(err.to_string().contains("checksum mismatch"));
        assert!(!dir.join("ws").join(DB_FILE).exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
