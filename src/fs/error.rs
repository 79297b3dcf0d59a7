use std::fmt;

/// 文件系统错误类型
#[derive(Debug)]
pub enum FileSystemError {
    Io(std::io::Error),    // 底层 I/O 错误
    NoFreeBlocks,          // 位图已满
    NoFreeInodes,          // inode 表已满
    NotFound(String),      // 按名字找不到父目录或目标
    DirectoryFull,         // 目录的 3 个直接块都已写满
    FileTooLarge { len: usize, max: usize },
    OutOfRange {
        what: &'static str,
        index: usize,
        limit: usize,
    },
    InvalidCapacity(String),   // 格式化参数不在 1..=255
    InvalidPath(String),       // 路径非法
    NotADirectory(String),     // 期望目录，实际不是
    IsADirectory(String),      // 期望文件，实际是目录
    DirectoryNotEmpty(String), // 目录非空
    Corrupted(String),         // 镜像内容无法解码
}

impl From<std::io::Error> for FileSystemError {
    fn from(e: std::io::Error) -> Self {
        FileSystemError::Io(e)
    }
}

impl From<bincode::Error> for FileSystemError {
    fn from(e: bincode::Error) -> Self {
        FileSystemError::Corrupted(e.to_string())
    }
}

impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Disk I/O error: {}", e),
            Self::NoFreeBlocks => write!(f, "No free data block available"),
            Self::NoFreeInodes => write!(f, "No free inode available"),
            Self::NotFound(name) => write!(f, "File or directory not found: {}", name),
            Self::DirectoryFull => write!(f, "Directory has no room for another entry"),
            Self::FileTooLarge { len, max } => {
                write!(f, "File of {} bytes exceeds the {}-byte limit", len, max)
            }
            Self::OutOfRange { what, index, limit } => {
                write!(f, "{} {} out of range (limit {})", what, index, limit)
            }
            Self::InvalidCapacity(desc) => write!(f, "Invalid capacity: {}", desc),
            Self::InvalidPath(path) => write!(f, "Invalid path: {}", path),
            Self::NotADirectory(path) => write!(f, "Expected a directory, found a file: {}", path),
            Self::IsADirectory(path) => write!(f, "Expected a file, found a directory: {}", path),
            Self::DirectoryNotEmpty(path) => write!(f, "Directory is not empty: {}", path),
            Self::Corrupted(desc) => write!(f, "File system corrupted: {}", desc),
        }
    }
}

// 支持链式错误，方便追踪底层原因
impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// 文件系统统一结果类型
pub type Result<T> = std::result::Result<T, FileSystemError>;
