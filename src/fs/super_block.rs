use serde::{Deserialize, Serialize};

use crate::{
    disk::BackingStore,
    fs::{
        config::SUPER_BLOCK_SIZE,
        error::{FileSystemError, Result},
        layout::Geometry,
    },
};

/// 镜像开头的 3 字节元数据，格式化时写一次，之后只读
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperBlock {
    pub block_size: u8,
    pub num_blocks: u8,
    pub num_inodes: u8,
}

impl SuperBlock {
    pub fn new(geometry: Geometry) -> Self {
        let [block_size, num_blocks, num_inodes] = geometry.to_bytes();
        Self {
            block_size,
            num_blocks,
            num_inodes,
        }
    }

    pub fn load(disk: &impl BackingStore) -> Result<Self> {
        let mut buf = [0u8; SUPER_BLOCK_SIZE as usize];
        disk.read_at(0, &mut buf)?;
        Ok(bincode::deserialize(&buf)?)
    }

    pub fn sync(&self, disk: &impl BackingStore) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        disk.write_at(0, &bytes)?;
        Ok(())
    }

    /// 读回来的超级块可能是 0，这里再按格式化时的规则校验一次
    pub fn geometry(&self) -> Result<Geometry> {
        Geometry::new(
            self.block_size as usize,
            self.num_blocks as usize,
            self.num_inodes as usize,
        )
        .map_err(|e| FileSystemError::Corrupted(format!("bad superblock: {}", e)))
    }
}
