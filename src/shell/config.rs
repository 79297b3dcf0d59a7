use std::path::PathBuf;

pub const DISK_ENV: &str = "MINIFS_DISK";
pub const DEFAULT_DISK_PATH: &str = "disk.img";
const HISTORY_FILE: &str = ".minifs_history";

/// `format` 不带参数时使用的几何参数：块大小 / 块数 / inode 数
pub const DEFAULT_GEOMETRY: (usize, usize, usize) = (16, 64, 32);

#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub disk_path: PathBuf,
    pub history_path: PathBuf,
    pub history_size: usize,
    pub default_geometry: (usize, usize, usize),
}

impl ShellConfig {
    /// 镜像路径优先取第一个命令行参数，其次 `MINIFS_DISK`，最后是 `disk.img`
    pub fn from_env() -> Self {
        let disk_path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var(DISK_ENV).ok())
            .unwrap_or_else(|| DEFAULT_DISK_PATH.to_string());

        let history_path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(HISTORY_FILE);

        Self {
            disk_path: PathBuf::from(disk_path),
            history_path,
            history_size: 100,
            default_geometry: DEFAULT_GEOMETRY,
        }
    }
}
