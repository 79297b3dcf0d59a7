use crate::{
    disk::BackingStore,
    fs::{
        error::{FileSystemError, Result},
        layout::Layout,
    },
};

/// 数据块位图：第 i 位为 1 表示数据块 i 被某个 inode 的直接块引用。
/// 每次修改都立即写回磁盘。
#[derive(Debug)]
pub struct DataBlockBitmap<'a, D: BackingStore> {
    disk: &'a D,
    layout: Layout,
}

impl<'a, D: BackingStore> DataBlockBitmap<'a, D> {
    pub fn new(disk: &'a D, layout: Layout) -> Self {
        Self { disk, layout }
    }

    fn check(&self, block_index: usize) -> Result<()> {
        if block_index >= self.layout.num_blocks() {
            return Err(FileSystemError::OutOfRange {
                what: "data block",
                index: block_index,
                limit: self.layout.num_blocks(),
            });
        }
        Ok(())
    }

    fn byte_offset(&self, block_index: usize) -> u64 {
        self.layout.bitmap_offset() + (block_index / 8) as u64
    }

    pub fn is_used(&self, block_index: usize) -> Result<bool> {
        self.check(block_index)?;
        let byte = self.disk.read_byte(self.byte_offset(block_index))?;
        Ok(byte & (1 << (block_index % 8)) != 0)
    }

    /// 只改目标位，同一字节里的其他位保持原样
    pub fn set(&self, block_index: usize, used: bool) -> Result<()> {
        self.check(block_index)?;
        let offset = self.byte_offset(block_index);
        let mask = 1u8 << (block_index % 8);
        let byte = self.disk.read_byte(offset)?;
        let byte = if used { byte | mask } else { byte & !mask };
        self.disk.write_byte(offset, byte)?;
        Ok(())
    }

    /// 整个位图填成同一个字节值（格式化时填 0）
    pub fn fill(&self, value: u8) -> Result<()> {
        let bytes = vec![value; self.layout.bitmap_size() as usize];
        self.disk.write_at(self.layout.bitmap_offset(), &bytes)?;
        Ok(())
    }

    pub fn load(&self) -> Result<Vec<u8>> {
        let mut bits = vec![0u8; self.layout.bitmap_size() as usize];
        self.disk.read_at(self.layout.bitmap_offset(), &mut bits)?;
        Ok(bits)
    }

    /// 先按字节、再按位（低位优先）扫描，返回第一个空闲块号。
    /// 最后一个字节里超出 num_blocks 的填充位不参与分配。
    pub fn first_free(&self) -> Result<Option<usize>> {
        let total = self.layout.num_blocks();
        for (byte_index, byte) in self.load()?.into_iter().enumerate() {
            if byte == 0xFF {
                continue;
            }
            for bit in 0..8 {
                let block_index = byte_index * 8 + bit;
                if block_index >= total {
                    return Ok(None);
                }
                if byte & (1 << bit) == 0 {
                    return Ok(Some(block_index));
                }
            }
        }
        Ok(None)
    }

    pub fn used_count(&self) -> Result<usize> {
        let total = self.layout.num_blocks();
        let bits = self.load()?;
        Ok((0..total)
            .filter(|&i| bits[i / 8] & (1 << (i % 8)) != 0)
            .count())
    }
}
