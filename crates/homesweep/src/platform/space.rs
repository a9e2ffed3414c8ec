use crate::error::{HomesweepError, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskSpace {
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub available_bytes: u64,
}

impl DiskSpace {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }

    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.used_bytes() as f64 / self.total_bytes as f64 * 100.0
        }
    }
}

/// Capacity of the filesystem holding `path`.
pub fn get_disk_space<P: AsRef<Path>>(path: P) -> Result<DiskSpace> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(HomesweepError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    #[cfg(unix)]
    {
        use std::ffi::CString;
        use std::mem;
        use std::os::unix::ffi::OsStrExt;

        let path_cstr = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
            HomesweepError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path contains null byte",
            ))
        })?;

        let mut stat: libc::statvfs = unsafe { mem::zeroed() };
        let result = unsafe { libc::statvfs(path_cstr.as_ptr(), &mut stat) };

        if result != 0 {
            return Err(HomesweepError::Io(std::io::Error::last_os_error()));
        }

        let block_size = stat.f_frsize as u64;

        Ok(DiskSpace {
            total_bytes: stat.f_blocks as u64 * block_size,
            free_bytes: stat.f_bfree as u64 * block_size,
            available_bytes: stat.f_bavail as u64 * block_size,
        })
    }

    #[cfg(not(unix))]
    {
        Err(HomesweepError::Config(
            "Disk space checking not implemented for this platform".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_used_percent() {
        let space = DiskSpace {
            total_bytes: 1000,
            free_bytes: 250,
            available_bytes: 200,
        };
        assert_eq!(space.used_bytes(), 750);
        assert_eq!(space.used_percent(), 75.0);
    }

    #[cfg(unix)]
    #[test]
    fn test_get_disk_space_for_tempdir() {
        let temp_dir = TempDir::new().unwrap();
        let space = get_disk_space(temp_dir.path()).unwrap();
        assert!(space.total_bytes > 0);
        assert!(space.available_bytes <= space.total_bytes);
    }

    #[test]
    fn test_get_disk_space_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        assert!(get_disk_space(temp_dir.path().join("missing")).is_err());
    }
}
