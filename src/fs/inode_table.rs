use serde::{Deserialize, Serialize};

use crate::{
    disk::BackingStore,
    fs::{
        config::{
            DIRECT_PTRS, DOUBLE_INDIRECT_PTRS, INDIRECT_PTRS, INODE_RECORD_SIZE, NAME_LEN,
        },
        error::{FileSystemError, Result},
        layout::Layout,
    },
};

/// 名字按存储形式比较：截断到 10 字节，不足补 0
pub type InodeName = [u8; NAME_LEN];

pub fn encode_name(name: &str) -> InodeName {
    let mut buf = [0u8; NAME_LEN];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_LEN);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

/// 磁盘上的 22 字节 inode 记录。
///
/// 字段顺序就是磁盘顺序，bincode 对 u8 和定长数组不加任何前缀，
/// 序列化结果正好是记录的原始字节。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inode {
    pub used: u8,
    pub is_dir: u8,
    pub name: InodeName,
    pub size: u8, // 文件：字节数；目录：子项数
    pub direct_blocks: [u8; DIRECT_PTRS],
    // 间接块只占位，永远为 0
    pub indirect_blocks: [u8; INDIRECT_PTRS],
    pub double_indirect_blocks: [u8; DOUBLE_INDIRECT_PTRS],
}

impl Inode {
    pub fn file(name: &str, size: u8, blocks: &[u8]) -> Self {
        let mut direct_blocks = [0u8; DIRECT_PTRS];
        direct_blocks[..blocks.len()].copy_from_slice(blocks);
        Self {
            used: 1,
            is_dir: 0,
            name: encode_name(name),
            size,
            direct_blocks,
            ..Self::default()
        }
    }

    /// 目录从创建起就持有一个块，即使还没有子项
    pub fn directory(name: &str, first_block: u8) -> Self {
        Self {
            used: 1,
            is_dir: 1,
            name: encode_name(name),
            size: 0,
            direct_blocks: [first_block, 0, 0],
            ..Self::default()
        }
    }

    /// 空槽位：全部字段清零
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_used(&self) -> bool {
        self.used != 0
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir != 0
    }

    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    pub fn rename(&mut self, name: &str) {
        self.name = encode_name(name);
    }

    /// 当前实际占用的直接块数。
    ///
    /// 块号 0 是合法块号，所以不能靠“指针非 0”来判断；
    /// 占用数由 size 推出：文件是 ceil(size / block_size)，
    /// 目录至少保留 1 块。
    pub fn block_count(&self, block_size: usize) -> usize {
        let blocks = (self.size as usize + block_size - 1) / block_size;
        if self.is_dir() {
            blocks.max(1)
        } else {
            blocks
        }
    }

    pub fn blocks(&self, block_size: usize) -> &[u8] {
        let count = self.block_count(block_size).min(DIRECT_PTRS);
        &self.direct_blocks[..count]
    }
}

/// inode 表：按槽位读写定长记录，线性扫描查找
#[derive(Debug)]
pub struct InodeTable<'a, D: BackingStore> {
    disk: &'a D,
    layout: Layout,
}

impl<'a, D: BackingStore> InodeTable<'a, D> {
    pub fn new(disk: &'a D, layout: Layout) -> Self {
        Self { disk, layout }
    }

    fn check(&self, slot: usize) -> Result<()> {
        if slot >= self.layout.num_inodes() {
            return Err(FileSystemError::OutOfRange {
                what: "inode slot",
                index: slot,
                limit: self.layout.num_inodes(),
            });
        }
        Ok(())
    }

    pub fn read_slot(&self, slot: usize) -> Result<Inode> {
        self.check(slot)?;
        let mut buf = [0u8; INODE_RECORD_SIZE as usize];
        self.disk.read_at(self.layout.inode_offset(slot), &mut buf)?;
        Ok(bincode::deserialize(&buf)?)
    }

    pub fn write_slot(&self, slot: usize, inode: &Inode) -> Result<()> {
        self.check(slot)?;
        let bytes = bincode::serialize(inode)?;
        self.disk.write_at(self.layout.inode_offset(slot), &bytes)?;
        Ok(())
    }

    pub fn clear_slot(&self, slot: usize) -> Result<()> {
        self.write_slot(slot, &Inode::empty())
    }

    /// 从 0 号槽位开始找第一个空槽
    pub fn find_free_slot(&self) -> Result<usize> {
        for slot in 0..self.layout.num_inodes() {
            if !self.read_slot(slot)?.is_used() {
                return Ok(slot);
            }
        }
        Err(FileSystemError::NoFreeInodes)
    }

    /// 在整张表里按名字查找，第一个命中者胜出。
    ///
    /// 查找是全局的，不局限于某个父目录的子项：
    /// 不同目录下的同名项无法区分。
    pub fn find_by_name(&self, name: &str, require_dir: bool) -> Result<usize> {
        let wanted = encode_name(name);
        for slot in 0..self.layout.num_inodes() {
            let inode = self.read_slot(slot)?;
            if inode.is_used() && inode.name == wanted && (!require_dir || inode.is_dir()) {
                return Ok(slot);
            }
        }
        Err(FileSystemError::NotFound(name.to_string()))
    }

    /// 所有已占用的槽位及其记录
    pub fn used(&self) -> Result<Vec<(usize, Inode)>> {
        let mut used = Vec::new();
        for slot in 0..self.layout.num_inodes() {
            let inode = self.read_slot(slot)?;
            if inode.is_used() {
                used.push((slot, inode));
            }
        }
        Ok(used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{disk::MemDisk, fs::layout::Geometry};

    fn setup() -> (MemDisk, Layout) {
        let layout = Layout::new(Geometry::new(4, 8, 4).unwrap());
        let disk = MemDisk::new();
        disk.truncate(layout.total_size()).unwrap();
        (disk, layout)
    }

    #[test]
    fn record_is_twenty_two_raw_bytes() {
        let inode = Inode::file("a.txt", 5, &[1, 2]);
        let bytes = bincode::serialize(&inode).unwrap();
        assert_eq!(bytes.len(), INODE_RECORD_SIZE as usize);
        assert_eq!(&bytes[..2], &[1, 0]);
        assert_eq!(&bytes[2..7], b"a.txt");
        assert_eq!(&bytes[7..12], &[0; 5]);
        assert_eq!(bytes[12], 5);
        assert_eq!(&bytes[13..16], &[1, 2, 0]);
        assert_eq!(&bytes[16..], &[0; 6]);
    }

    #[test]
    fn long_names_are_truncated() {
        let inode = Inode::directory("abcdefghijklmnop", 0);
        assert_eq!(inode.name(), "abcdefghij");
        assert_eq!(encode_name("abcdefghijXYZ"), encode_name("abcdefghij"));
    }

    #[test]
    fn block_count_follows_size() {
        let file = Inode::file("f", 5, &[1, 2]);
        assert_eq!(file.block_count(4), 2);
        assert_eq!(Inode::file("e", 0, &[]).block_count(4), 0);
        let mut dir = Inode::directory("d", 3);
        assert_eq!(dir.block_count(4), 1);
        dir.size = 5;
        assert_eq!(dir.block_count(4), 2);
    }

    #[test]
    fn slots_round_trip_and_bounds() {
        let (disk, layout) = setup();
        let table = InodeTable::new(&disk, layout);
        let inode = Inode::file("x", 3, &[7]);
        table.write_slot(2, &inode).unwrap();
        assert_eq!(table.read_slot(2).unwrap(), inode);
        assert!(matches!(
            table.read_slot(4),
            Err(FileSystemError::OutOfRange { index: 4, limit: 4, .. })
        ));
    }

    #[test]
    fn scans_return_first_match() {
        let (disk, layout) = setup();
        let table = InodeTable::new(&disk, layout);
        table.write_slot(0, &Inode::directory("/", 0)).unwrap();
        table.write_slot(1, &Inode::file("dup", 0, &[])).unwrap();
        table.write_slot(3, &Inode::directory("dup", 1)).unwrap();

        assert_eq!(table.find_free_slot().unwrap(), 2);
        assert_eq!(table.find_by_name("dup", false).unwrap(), 1);
        assert_eq!(table.find_by_name("dup", true).unwrap(), 3);
        assert!(matches!(
            table.find_by_name("nope", false),
            Err(FileSystemError::NotFound(_))
        ));

        table.write_slot(2, &Inode::file("y", 0, &[])).unwrap();
        assert!(matches!(
            table.find_free_slot(),
            Err(FileSystemError::NoFreeInodes)
        ));
    }
}
