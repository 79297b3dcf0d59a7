//! 目录子项表。
//!
//! 目录的内容是一串紧密排列的 1 字节 inode 槽位号，按 direct_blocks
//! 的顺序从左到右铺开，每块 block_size 项。逻辑位置 k 的子项位于
//! `direct_blocks[k / block_size]` 的第 `k % block_size` 字节。

use crate::{
    disk::BackingStore,
    fs::{
        config::DIRECT_PTRS,
        data_area::DataArea,
        error::{FileSystemError, Result},
        inode_table::{Inode, InodeTable},
        layout::Layout,
    },
};

/// 目录项类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirEntryType {
    File,
    Directory,
}

/// 一个解码后的目录项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub inode_index: usize,
    pub entry_type: DirEntryType,
    pub size: usize,
}

impl DirEntry {
    pub fn new(inode_index: usize, inode: &Inode) -> Self {
        Self {
            name: inode.name(),
            inode_index,
            entry_type: if inode.is_dir() {
                DirEntryType::Directory
            } else {
                DirEntryType::File
            },
            size: inode.size as usize,
        }
    }
}

/// 子项表的读写都以目录的槽位号为入口：每次先从磁盘读出 inode，
/// 改完立刻写回，不持有任何副本。
#[derive(Debug)]
pub struct Directory<'a, D: BackingStore> {
    layout: Layout,
    table: InodeTable<'a, D>,
    data: DataArea<'a, D>,
}

impl<'a, D: BackingStore> Directory<'a, D> {
    pub fn new(disk: &'a D, layout: Layout) -> Self {
        Self {
            layout,
            table: InodeTable::new(disk, layout),
            data: DataArea::new(disk, layout),
        }
    }

    fn load_dir(&self, dir_slot: usize) -> Result<Inode> {
        let dir = self.table.read_slot(dir_slot)?;
        if !dir.is_used() || !dir.is_dir() {
            return Err(FileSystemError::NotADirectory(dir.name()));
        }
        Ok(dir)
    }

    fn locate(&self, dir: &Inode, position: usize) -> (u8, usize) {
        let block_size = self.layout.block_size();
        (dir.direct_blocks[position / block_size], position % block_size)
    }

    fn read_entry(&self, dir: &Inode, position: usize) -> Result<u8> {
        let (block, intra) = self.locate(dir, position);
        self.data.read_byte(block, intra)
    }

    fn write_entry(&self, dir: &Inode, position: usize, child: u8) -> Result<()> {
        let (block, intra) = self.locate(dir, position);
        self.data.write_byte(block, intra, child)
    }

    /// 按存储顺序解码全部子项
    pub fn children(&self, dir_slot: usize) -> Result<Vec<usize>> {
        let dir = self.load_dir(dir_slot)?;
        (0..dir.size as usize)
            .map(|pos| self.read_entry(&dir, pos).map(usize::from))
            .collect()
    }

    /// 追加一个子项。最后一块写满时先分配新块、记进下一个直接块指针。
    pub fn append(&self, dir_slot: usize, child: usize) -> Result<()> {
        let mut dir = self.load_dir(dir_slot)?;
        let size = dir.size as usize;
        let block_size = self.layout.block_size();

        if size >= self.layout.max_children() {
            return Err(FileSystemError::DirectoryFull);
        }

        if size > 0 && size % block_size == 0 {
            let next = size / block_size;
            if next >= DIRECT_PTRS {
                return Err(FileSystemError::DirectoryFull);
            }
            dir.direct_blocks[next] = self.data.allocate()?;
        }

        self.write_entry(&dir, size, child as u8)?;
        dir.size += 1;
        self.table.write_slot(dir_slot, &dir)?;
        log::debug!("appended inode {} to directory slot {}", child, dir_slot);
        Ok(())
    }

    /// 删除一个子项并把后面的项整体左移一格（可跨块）。
    /// 左移后若最后一块整块空出且目录仍有其他块，释放它。
    pub fn remove(&self, dir_slot: usize, child: usize) -> Result<()> {
        let mut dir = self.load_dir(dir_slot)?;
        let size = dir.size as usize;
        let block_size = self.layout.block_size();

        let mut found = None;
        for pos in 0..size {
            if self.read_entry(&dir, pos)? as usize == child {
                found = Some(pos);
                break;
            }
        }
        let position =
            found.ok_or_else(|| FileSystemError::NotFound(format!("inode {} in directory", child)))?;

        for k in position..size - 1 {
            let next = self.read_entry(&dir, k + 1)?;
            self.write_entry(&dir, k, next)?;
            log::trace!("shifted entry {} -> {} in directory slot {}", k + 1, k, dir_slot);
        }

        let new_size = size - 1;
        dir.size = new_size as u8;

        // 目录至少保留一块，所以 new_size == 0 时不释放
        if new_size > 0 && new_size % block_size == 0 {
            let emptied = new_size / block_size;
            self.data.release(dir.direct_blocks[emptied])?;
            dir.direct_blocks[emptied] = 0;
        }

        self.table.write_slot(dir_slot, &dir)?;
        log::debug!("removed inode {} from directory slot {}", child, dir_slot);
        Ok(())
    }

    /// 从一个目录摘下、挂到另一个目录；同一目录时什么都不做
    pub fn move_child(&self, child: usize, from_slot: usize, to_slot: usize) -> Result<()> {
        if from_slot == to_slot {
            return Ok(());
        }
        self.remove(from_slot, child)?;
        self.append(to_slot, child)
    }

    /// 找出子项表里列着 `child` 的目录，取槽位号最小的那个
    pub fn parent_of(&self, child: usize) -> Result<Option<usize>> {
        for (slot, inode) in self.table.used()? {
            if inode.is_dir() && self.children(slot)?.contains(&child) {
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }

    /// 解码子项并带上各自的 inode 信息
    pub fn list(&self, dir_slot: usize) -> Result<Vec<DirEntry>> {
        self.children(dir_slot)?
            .into_iter()
            .map(|slot| Ok(DirEntry::new(slot, &self.table.read_slot(slot)?)))
            .collect()
    }
}
