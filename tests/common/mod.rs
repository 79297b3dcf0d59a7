//! 集成测试共用的辅助函数
#![allow(dead_code)]

use minifs::{FileSystem, Geometry, Inode, MemDisk};

/// 刚格式化好的内存文件系统
pub fn formatted(block_size: usize, num_blocks: usize, num_inodes: usize) -> FileSystem<MemDisk> {
    let geometry = Geometry::new(block_size, num_blocks, num_inodes).unwrap();
    FileSystem::format(MemDisk::new(), geometry).unwrap()
}

/// 位图里置位的所有块号
pub fn used_blocks(fs: &FileSystem<MemDisk>) -> Vec<usize> {
    let bitmap = fs.data();
    (0..fs.layout().num_blocks())
        .filter(|&b| bitmap.bitmap().is_used(b).unwrap())
        .collect()
}

pub fn inode(fs: &FileSystem<MemDisk>, slot: usize) -> Inode {
    fs.table().read_slot(slot).unwrap()
}

pub fn children(fs: &FileSystem<MemDisk>, slot: usize) -> Vec<usize> {
    fs.directory().children(slot).unwrap()
}

pub fn names(fs: &FileSystem<MemDisk>, dir: &str) -> Vec<String> {
    fs.list_dir(dir)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect()
}

pub fn assert_consistent(fs: &FileSystem<MemDisk>) {
    let report = fs.check().unwrap();
    assert!(report.is_clean(), "inconsistent: {:?}", report.problems);
}
