//! # File I/O
//!
//! Design file operations:
//! - **Atomic saves**: write `.spd.tmp`, fsync, rename over the target
//! - **Locking**: OS lock plus a `.spd.lock` sidecar naming the holder
//! - **Version validation**: refuse files from an incompatible schema
//!
//! ## Example
//!
//! ```rust,no_run
//! use spring_core::design::SpringDesign;
//! use spring_core::file_io::{load_design, save_design, DesignLock};
//! use std::path::Path;
//!
//! let design = SpringDesign::new("Designer", "RS-001");
//! let path = Path::new("front_axle.spd");
//!
//! let lock = DesignLock::acquire(path, "designer@example.com")?;
//! save_design(&design, path)?;
//! drop(lock);
//!
//! let loaded = load_design(path)?;
//! assert_eq!(loaded.id, design.id);
//! # Ok::<(), spring_core::errors::SpringError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::calculations::calibration::ExperimentalData;
use crate::design::{SpringDesign, SCHEMA_VERSION};
use crate::errors::{SpringError, SpringResult};

/// Design file extension
pub const DESIGN_EXTENSION: &str = "spd";

/// Locks older than this are taken over regardless of holder.
pub const STALE_LOCK_HOURS: i64 = 24;

/// Contents of a `.spd.lock` sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Email or username of the holder
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process.
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// The holder is gone: a dead process on this host, or simply too old.
    pub fn is_stale(&self) -> bool {
        if Utc::now() - self.locked_at > Duration::hours(STALE_LOCK_HOURS) {
            return true;
        }
        match hostname() {
            Some(host) if host == self.machine => !process_alive(self.pid),
            _ => false,
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

fn process_alive(pid: u32) -> bool {
    #[cfg(unix)]
    {
        Path::new(&format!("/proc/{pid}")).exists()
    }
    #[cfg(windows)]
    {
        std::process::Command::new("tasklist")
            .args(["/FI", &format!("PID eq {pid}"), "/NH"])
            .output()
            .map(|out| String::from_utf8_lossy(&out.stdout).contains(&pid.to_string()))
            .unwrap_or(true)
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = pid;
        true
    }
}

/// Exclusive edit lock on a design file, released on drop.
pub struct DesignLock {
    lock_path: PathBuf,
    /// Holds the OS lock for the guard's lifetime
    _handle: File,
    pub info: LockInfo,
}

impl DesignLock {
    /// Acquire the lock, taking over a stale one.
    ///
    /// Fails with `SpringError::FileLocked` when a live holder exists.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> SpringResult<Self> {
        let lock_path = lock_path_for(path);

        if let Some(holder) = read_lock_info(&lock_path).filter(|info| !info.is_stale()) {
            return Err(SpringError::file_locked(
                path.display().to_string(),
                format!("{} ({})", holder.user_id, holder.machine),
                holder.locked_at.to_rfc3339(),
            ));
        }

        let io_err = |op: &str, e: std::io::Error| {
            SpringError::file_error(op, lock_path.display().to_string(), e.to_string())
        };

        let mut handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| io_err("create lock", e))?;

        handle.try_lock_exclusive().map_err(|_| {
            SpringError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let info = LockInfo::new(user_id);
        let json = serde_json::to_string_pretty(&info).map_err(SpringError::serialization)?;
        handle.write_all(json.as_bytes()).map_err(|e| io_err("write lock", e))?;
        handle.sync_all().map_err(|e| io_err("sync lock", e))?;

        Ok(DesignLock {
            lock_path,
            _handle: handle,
            info,
        })
    }

    /// Current live holder of `path`, if any.
    pub fn holder(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).filter(|info| !info.is_stale())
    }
}

impl Drop for DesignLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `front.spd` → `front.spd.lock`
fn lock_path_for(design_path: &Path) -> PathBuf {
    sibling_with_suffix(design_path, "lock")
}

/// `front.spd` → `front.spd.tmp`
fn tmp_path_for(design_path: &Path) -> PathBuf {
    sibling_with_suffix(design_path, "tmp")
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let extension = path
        .extension()
        .map(|e| format!("{}.{suffix}", e.to_string_lossy()))
        .unwrap_or_else(|| suffix.to_string());
    path.with_extension(extension)
}

fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save a design atomically.
///
/// Writes the JSON to a `.tmp` sibling, syncs it, then renames it over
/// `path`; an interrupted save leaves the previous file intact.
pub fn save_design(design: &SpringDesign, path: &Path) -> SpringResult<()> {
    let json = serde_json::to_string_pretty(design).map_err(SpringError::serialization)?;
    let tmp_path = tmp_path_for(path);
    let tmp_err = |op: &str, e: std::io::Error| {
        SpringError::file_error(op, tmp_path.display().to_string(), e.to_string())
    };

    let mut tmp = File::create(&tmp_path).map_err(|e| tmp_err("create temp file", e))?;
    tmp.write_all(json.as_bytes()).map_err(|e| tmp_err("write temp file", e))?;
    tmp.sync_all().map_err(|e| tmp_err("sync temp file", e))?;
    drop(tmp);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        SpringError::file_error("rename to final", path.display().to_string(), e.to_string())
    })
}

/// Load a design and check its schema version.
pub fn load_design(path: &Path) -> SpringResult<SpringDesign> {
    let design: SpringDesign = read_json(path)?;
    validate_version(&design.meta.version)?;
    Ok(design)
}

/// Lock, load, edit and save a design in one step.
///
/// The lock is held across the read, so a save by another editor between load
/// and save cannot be lost. Nothing is written when `edit` fails.
pub fn update_design<T>(
    path: &Path,
    user_id: impl Into<String>,
    edit: impl FnOnce(&mut SpringDesign) -> SpringResult<T>,
) -> SpringResult<T> {
    let _lock = DesignLock::acquire(path, user_id)?;
    let mut design = load_design(path)?;
    let out = edit(&mut design)?;
    save_design(&design, path)?;
    Ok(out)
}

/// Load a design together with the live lock holder, if someone else is editing.
pub fn load_design_with_lock_check(path: &Path) -> SpringResult<(SpringDesign, Option<LockInfo>)> {
    let design = load_design(path)?;
    Ok((design, DesignLock::holder(path)))
}

/// Load measured force-deflection data from a JSON file.
pub fn load_experimental_data(path: &Path) -> SpringResult<ExperimentalData> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> SpringResult<T> {
    let contents = fs::read_to_string(path)
        .map_err(|e| SpringError::file_error("read", path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&contents)
        .map_err(|e| SpringError::serialization(format!("Invalid JSON in {}: {e}", path.display())))
}

/// Major must match; in 0.x a newer minor is also refused.
fn validate_version(file_version: &str) -> SpringResult<()> {
    let mismatch = || SpringError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let parse = |v: &str| -> Option<(u32, u32)> {
        let mut parts = v.split('.').map(|p| p.parse::<u32>().ok());
        Some((parts.next()??, parts.next().flatten().unwrap_or(0)))
    };

    let (file_major, file_minor) = parse(file_version).ok_or_else(mismatch)?;
    let (major, minor) = parse(SCHEMA_VERSION).ok_or_else(mismatch)?;

    if file_major != major || (major == 0 && file_minor > minor) {
        return Err(mismatch());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_design_path(name: &str) -> PathBuf {
        temp_dir().join(format!("coilform_test_{name}_{}.spd", std::process::id()))
    }

    #[test]
    fn test_sidecar_paths() {
        let path = Path::new("/designs/front.spd");
        assert_eq!(lock_path_for(path), Path::new("/designs/front.spd.lock"));
        assert_eq!(tmp_path_for(path), Path::new("/designs/front.spd.tmp"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_design_path("roundtrip");
        let mut design = SpringDesign::new("Test Designer", "RS-TEST");
        design.laws.total_turns = 9.5;
        save_design(&design, &path).unwrap();

        let loaded = load_design(&path).unwrap();
        assert_eq!(loaded.id, design.id);
        assert_eq!(loaded.meta.designer, "Test Designer");
        assert_eq!(loaded.laws, design.laws);
        assert!(!tmp_path_for(&path).exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_lock_blocks_second_holder() {
        let path = temp_design_path("lock");
        let lock = DesignLock::acquire(&path, "first@example.com").unwrap();
        assert!(lock_path_for(&path).exists());
        assert_eq!(DesignLock::holder(&path).unwrap().user_id, "first@example.com");

        let err = DesignLock::acquire(&path, "second@example.com").err().unwrap();
        assert_eq!(err.error_code(), "FILE_LOCKED");

        drop(lock);
        assert!(!lock_path_for(&path).exists());
        assert!(DesignLock::holder(&path).is_none());
    }

    #[test]
    fn test_update_holds_lock_across_read() {
        let path = temp_design_path("update");
        save_design(&SpringDesign::new("Designer", "RS-UPD"), &path).unwrap();

        let turns = update_design(&path, "editor@example.com", |design| {
            assert!(DesignLock::holder(&path).is_some());
            design.laws.total_turns = 7.25;
            Ok(design.laws.total_turns)
        })
        .unwrap();
        assert_eq!(turns, 7.25);
        assert_eq!(load_design(&path).unwrap().laws.total_turns, 7.25);
        assert!(DesignLock::holder(&path).is_none());

        // Another holder blocks the update before anything is read or written
        let other = DesignLock::acquire(&path, "other@example.com").unwrap();
        let err = update_design(&path, "editor@example.com", |design| {
            design.laws.total_turns = 3.0;
            Ok(())
        })
        .unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        drop(other);
        assert_eq!(load_design(&path).unwrap().laws.total_turns, 7.25);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_stale_lock_is_taken_over() {
        let path = temp_design_path("stale");
        let mut old = LockInfo::new("gone@example.com");
        old.locked_at = Utc::now() - Duration::hours(STALE_LOCK_HOURS + 1);
        fs::write(lock_path_for(&path), serde_json::to_string(&old).unwrap()).unwrap();

        let lock = DesignLock::acquire(&path, "new@example.com").unwrap();
        assert_eq!(lock.info.user_id, "new@example.com");
        drop(lock);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_newer_file_is_refused() {
        let path = temp_design_path("newer");
        let mut design = SpringDesign::new("Designer", "RS-002");
        design.meta.version = "0.9.0".to_string();
        save_design(&design, &path).unwrap();

        let err = load_design(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_with_lock_check_and_bad_json() {
        let path = temp_design_path("check");
        save_design(&SpringDesign::new("Designer", "RS-003"), &path).unwrap();
        let (loaded, holder) = load_design_with_lock_check(&path).unwrap();
        assert_eq!(loaded.meta.design_code, "RS-003");
        assert!(holder.is_none());

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_design(&path).unwrap_err().error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);

        assert_eq!(load_design(&path).unwrap_err().error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_experimental_data_file() {
        let path = temp_dir().join(format!("coilform_test_samples_{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{ "samples": [ { "deflection": 0.0, "force": 0.0 }, { "deflection": 10.0, "force": 250.0 } ], "cycle_count": 5000 }"#,
        )
        .unwrap();
        let data = load_experimental_data(&path).unwrap();
        assert_eq!(data.samples.len(), 2);
        assert_eq!(data.cycle_count, Some(5000));
        let _ = fs::remove_file(&path);
    }
}
