//! 镜像的线性布局：
//!
//! ```text
//! 0                  超级块 (3 字节)
//! 3                  数据块位图 ceil(num_blocks / 8) 字节
//! 3 + bitmap_size    inode 表 num_inodes * 22 字节
//! ...                根索引占位字节 (1 字节，恒为 0)
//! ...                数据区 num_blocks * block_size 字节
//! ```

use std::num::NonZeroU8;

use crate::fs::{
    config::{BITMAP_OFFSET, DIRECT_PTRS, INODE_RECORD_SIZE, MAX_SIZE_FIELD, ROOT_INDEX_SIZE},
    error::{FileSystemError, Result},
};

/// 格式化参数。三个字段都只占 1 字节，所以取值范围是 1..=255
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    block_size: NonZeroU8,
    num_blocks: NonZeroU8,
    num_inodes: NonZeroU8,
}

impl Geometry {
    pub fn new(block_size: usize, num_blocks: usize, num_inodes: usize) -> Result<Self> {
        Ok(Self {
            block_size: capacity("block size", block_size)?,
            num_blocks: capacity("block count", num_blocks)?,
            num_inodes: capacity("inode count", num_inodes)?,
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size.get() as usize
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks.get() as usize
    }

    pub fn num_inodes(&self) -> usize {
        self.num_inodes.get() as usize
    }

    /// 写入超级块的原始字节
    pub fn to_bytes(&self) -> [u8; 3] {
        [
            self.block_size.get(),
            self.num_blocks.get(),
            self.num_inodes.get(),
        ]
    }
}

fn capacity(what: &str, value: usize) -> Result<NonZeroU8> {
    u8::try_from(value)
        .ok()
        .and_then(NonZeroU8::new)
        .ok_or_else(|| {
            FileSystemError::InvalidCapacity(format!("{} must be 1..=255, got {}", what, value))
        })
}

/// 由几何参数推出各区域的字节偏移，纯计算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    geometry: Geometry,
}

impl Layout {
    pub fn new(geometry: Geometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn block_size(&self) -> usize {
        self.geometry.block_size()
    }

    pub fn num_blocks(&self) -> usize {
        self.geometry.num_blocks()
    }

    pub fn num_inodes(&self) -> usize {
        self.geometry.num_inodes()
    }

    pub fn bitmap_offset(&self) -> u64 {
        BITMAP_OFFSET
    }

    pub fn bitmap_size(&self) -> u64 {
        (self.num_blocks() as u64 + 7) / 8
    }

    pub fn inode_table_offset(&self) -> u64 {
        self.bitmap_offset() + self.bitmap_size()
    }

    pub fn root_index_offset(&self) -> u64 {
        self.inode_table_offset() + self.num_inodes() as u64 * INODE_RECORD_SIZE
    }

    pub fn block_region_offset(&self) -> u64 {
        self.root_index_offset() + ROOT_INDEX_SIZE
    }

    /// 整个镜像的字节数
    pub fn total_size(&self) -> u64 {
        self.block_region_offset() + (self.num_blocks() * self.block_size()) as u64
    }

    /// 调用方负责先检查 slot 是否越界
    pub fn inode_offset(&self, slot: usize) -> u64 {
        self.inode_table_offset() + slot as u64 * INODE_RECORD_SIZE
    }

    pub fn block_offset(&self, block: usize) -> u64 {
        self.block_region_offset() + (block * self.block_size()) as u64
    }

    /// 一个文件最多能装多少字节：3 个直接块，同时受 1 字节 size 字段限制
    pub fn max_file_size(&self) -> usize {
        (DIRECT_PTRS * self.block_size()).min(MAX_SIZE_FIELD)
    }

    /// 一个目录最多能装多少子项，限制同上
    pub fn max_children(&self) -> usize {
        self.max_file_size()
    }
}
