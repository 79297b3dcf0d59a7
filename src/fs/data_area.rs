use crate::{
    disk::BackingStore,
    fs::{
        data_block_bitmap::DataBlockBitmap,
        error::{FileSystemError, Result},
        layout::Layout,
    },
};

/// 数据区与块分配器：位图负责占用状态，这里负责块内容
#[derive(Debug)]
pub struct DataArea<'a, D: BackingStore> {
    disk: &'a D,
    layout: Layout,
    bitmap: DataBlockBitmap<'a, D>,
}

impl<'a, D: BackingStore> DataArea<'a, D> {
    pub fn new(disk: &'a D, layout: Layout) -> Self {
        Self {
            disk,
            layout,
            bitmap: DataBlockBitmap::new(disk, layout),
        }
    }

    pub fn bitmap(&self) -> &DataBlockBitmap<'a, D> {
        &self.bitmap
    }

    pub fn find_free_block(&self) -> Result<usize> {
        self.bitmap.first_free()?.ok_or(FileSystemError::NoFreeBlocks)
    }

    /// 找到空闲块并置位。把块号记进 inode 是调用方的事。
    pub fn allocate(&self) -> Result<u8> {
        let block = self.find_free_block()?;
        self.bitmap.set(block, true)?;
        log::debug!("allocated data block {}", block);
        // num_blocks <= 255，块号一定放得进 1 字节
        Ok(block as u8)
    }

    /// 只清位，不擦内容；下次分配时会被覆盖
    pub fn release(&self, block: u8) -> Result<()> {
        self.bitmap.set(block as usize, false)?;
        log::debug!("released data block {}", block);
        Ok(())
    }

    fn offset(&self, block: u8, intra: usize) -> Result<u64> {
        if block as usize >= self.layout.num_blocks() {
            return Err(FileSystemError::OutOfRange {
                what: "data block",
                index: block as usize,
                limit: self.layout.num_blocks(),
            });
        }
        if intra >= self.layout.block_size() {
            return Err(FileSystemError::OutOfRange {
                what: "block offset",
                index: intra,
                limit: self.layout.block_size(),
            });
        }
        Ok(self.layout.block_offset(block as usize) + intra as u64)
    }

    pub fn read_byte(&self, block: u8, intra: usize) -> Result<u8> {
        Ok(self.disk.read_byte(self.offset(block, intra)?)?)
    }

    pub fn write_byte(&self, block: u8, intra: usize, value: u8) -> Result<()> {
        self.disk.write_byte(self.offset(block, intra)?, value)?;
        Ok(())
    }

    /// 从块首写入最多 block_size 字节，剩余部分不动
    pub fn write_block(&self, block: u8, buf: &[u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        // 末字节也要落在块内
        self.offset(block, buf.len() - 1)?;
        self.disk.write_at(self.offset(block, 0)?, buf)?;
        Ok(())
    }

    pub fn read_block(&self, block: u8, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        if len > 0 {
            self.offset(block, len - 1)?;
            self.disk.read_at(self.offset(block, 0)?, &mut buf)?;
        }
        Ok(buf)
    }

    /// 整个数据区清零（格式化时使用）
    pub fn zero_fill(&self) -> Result<()> {
        let len = self.layout.num_blocks() * self.layout.block_size();
        self.disk
            .write_at(self.layout.block_region_offset(), &vec![0u8; len])?;
        Ok(())
    }
}
