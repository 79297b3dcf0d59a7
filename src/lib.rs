//! MiniFS：存放在单个宿主文件（虚拟磁盘）里的极简 inode 文件系统。
//!
//! 镜像布局依次为超级块、数据块位图、inode 表、根索引占位字节和数据区，
//! 所有整数都是 1 字节无符号数。每个 inode 最多 3 个直接块，
//! 名字查找在整张 inode 表里进行，不区分所在目录。
//!
//! 下面的路径级函数每次调用都重新打开镜像文件；需要复用同一个存储
//! （例如内存盘）时直接使用 [`FileSystem`]。

use std::path::Path;

pub mod disk;
pub mod fs;
pub mod logging;

pub use disk::{BackingStore, FileDisk, MemDisk};
pub use fs::{
    check::{CheckReport, Inconsistency},
    directory::{DirEntry, DirEntryType},
    error::{FileSystemError, Result},
    inode_table::Inode,
    layout::{Geometry, Layout},
    FileSystem, Usage,
};

fn mount(disk_path: impl AsRef<Path>) -> Result<FileSystem<FileDisk>> {
    FileSystem::open(FileDisk::open_existing(disk_path)?)
}

/// 创建（或清空）镜像文件并格式化。参数先校验，不合法时不碰文件。
pub fn format(
    disk_path: impl AsRef<Path>,
    block_size: usize,
    num_blocks: usize,
    num_inodes: usize,
) -> Result<()> {
    let geometry = Geometry::new(block_size, num_blocks, num_inodes)?;
    FileSystem::format(FileDisk::open(disk_path)?, geometry)?;
    Ok(())
}

pub fn create_file(disk_path: impl AsRef<Path>, file_path: &str, content: &[u8]) -> Result<()> {
    mount(disk_path)?.create_file(file_path, content)?;
    Ok(())
}

pub fn create_directory(disk_path: impl AsRef<Path>, dir_path: &str) -> Result<()> {
    mount(disk_path)?.create_directory(dir_path)?;
    Ok(())
}

pub fn remove(disk_path: impl AsRef<Path>, target_path: &str) -> Result<()> {
    mount(disk_path)?.remove(target_path)
}

pub fn move_path(disk_path: impl AsRef<Path>, old_path: &str, new_path: &str) -> Result<()> {
    mount(disk_path)?.move_entry(old_path, new_path)
}
