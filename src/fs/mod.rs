use crate::{
    disk::BackingStore,
    fs::{
        check::CheckReport,
        config::{ROOT_INODE, ROOT_NAME},
        data_area::DataArea,
        directory::{DirEntry, Directory},
        error::{FileSystemError, Result},
        inode_table::{Inode, InodeTable},
        layout::{Geometry, Layout},
        path::{FsPath, PathResolver},
        super_block::SuperBlock,
    },
};

pub mod check;
pub mod config;
pub mod data_area;
pub mod data_block_bitmap;
pub mod directory;
pub mod error;
pub mod inode_table;
pub mod layout;
pub mod path;
pub mod super_block;

/// 块和 inode 的占用统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub block_size: usize,
    pub used_blocks: usize,
    pub total_blocks: usize,
    pub used_inodes: usize,
    pub total_inodes: usize,
}

/// 挂在一个后备存储上的文件系统。
///
/// 除了超级块推出的布局外不保存任何状态：每个操作都重新从磁盘读取，
/// 每一步修改都立即写回。操作由若干顺序步骤组成，中途失败时已完成的
/// 步骤不会回滚。
#[derive(Debug)]
pub struct FileSystem<D: BackingStore> {
    disk: D,         // 底层磁盘抽象层
    layout: Layout,  // 各区域偏移
}

impl<D: BackingStore> FileSystem<D> {
    /// 清空存储并写入一个只有空根目录的文件系统
    pub fn format(disk: D, geometry: Geometry) -> Result<Self> {
        let fs = Self {
            disk,
            layout: Layout::new(geometry),
        };

        fs.disk.truncate(0)?;
        SuperBlock::new(geometry).sync(&fs.disk)?;

        let data = fs.data();
        data.bitmap().fill(0)?;

        let table = fs.table();
        let root_block = data.allocate()?;
        table.write_slot(ROOT_INODE, &Inode::directory(ROOT_NAME, root_block))?;
        for slot in (ROOT_INODE + 1)..geometry.num_inodes() {
            table.clear_slot(slot)?;
        }

        // 根索引占位字节，永远是 0
        fs.disk.write_byte(fs.layout.root_index_offset(), 0)?;
        data.zero_fill()?;

        log::info!(
            "formatted: block size {}, {} blocks, {} inodes ({} bytes)",
            geometry.block_size(),
            geometry.num_blocks(),
            geometry.num_inodes(),
            fs.layout.total_size()
        );
        Ok(fs)
    }

    /// 读取超级块并挂载已有镜像
    pub fn open(disk: D) -> Result<Self> {
        let geometry = SuperBlock::load(&disk)?.geometry()?;
        let layout = Layout::new(geometry);
        log::debug!("mounted {:?}", geometry);
        Ok(Self { disk, layout })
    }

    pub fn disk(&self) -> &D {
        &self.disk
    }

    pub fn into_disk(self) -> D {
        self.disk
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn table(&self) -> InodeTable<'_, D> {
        InodeTable::new(&self.disk, self.layout)
    }

    pub fn data(&self) -> DataArea<'_, D> {
        DataArea::new(&self.disk, self.layout)
    }

    pub fn directory(&self) -> Directory<'_, D> {
        Directory::new(&self.disk, self.layout)
    }

    fn parse_non_root(path: &str) -> Result<FsPath> {
        let parsed = FsPath::parse(path)?;
        if parsed.is_root() {
            return Err(FileSystemError::InvalidPath(path.to_string()));
        }
        Ok(parsed)
    }

    /// 创建文件，返回新 inode 的槽位号。
    ///
    /// 顺序：解析父目录 -> 逐块分配并写入内容 -> 分配 inode 槽位 ->
    /// 写 inode -> 追加到父目录。
    pub fn create_file(&self, file_path: &str, content: &[u8]) -> Result<usize> {
        let path = Self::parse_non_root(file_path)?;
        let max = self.layout.max_file_size();
        if content.len() > max {
            return Err(FileSystemError::FileTooLarge {
                len: content.len(),
                max,
            });
        }

        let table = self.table();
        let data = self.data();
        let parent = PathResolver::new(&table).resolve_parent(&path)?;

        let mut blocks = Vec::new();
        for chunk in content.chunks(self.layout.block_size()) {
            let block = data.allocate()?;
            data.write_block(block, chunk)?;
            blocks.push(block);
        }

        let slot = table.find_free_slot()?;
        // 长度已检查过不超过 255
        table.write_slot(slot, &Inode::file(path.leaf(), content.len() as u8, &blocks))?;
        self.directory().append(parent, slot)?;

        log::info!("created file {} ({} bytes) at inode {}", path, content.len(), slot);
        Ok(slot)
    }

    /// 创建目录：新目录一开始就占一个块
    pub fn create_directory(&self, dir_path: &str) -> Result<usize> {
        let path = Self::parse_non_root(dir_path)?;

        let table = self.table();
        let parent = PathResolver::new(&table).resolve_parent(&path)?;

        let block = self.data().allocate()?;
        let slot = table.find_free_slot()?;
        table.write_slot(slot, &Inode::directory(path.leaf(), block))?;
        self.directory().append(parent, slot)?;

        log::info!("created directory {} at inode {}", path, slot);
        Ok(slot)
    }

    /// 删除文件或空目录。
    ///
    /// 先释放块、清空 inode，再从父目录的子项表里摘除。
    pub fn remove(&self, target_path: &str) -> Result<()> {
        let path = Self::parse_non_root(target_path)?;

        let table = self.table();
        let data = self.data();
        let resolver = PathResolver::new(&table);

        let slot = resolver.resolve_leaf(&path, false)?;
        let inode = table.read_slot(slot)?;
        if slot == ROOT_INODE {
            return Err(FileSystemError::InvalidPath(path.to_string()));
        }
        if inode.is_dir() && inode.size > 0 {
            return Err(FileSystemError::DirectoryNotEmpty(path.to_string()));
        }

        for &block in inode.blocks(self.layout.block_size()) {
            data.release(block)?;
        }
        table.clear_slot(slot)?;

        let parent = resolver.resolve_parent(&path)?;
        self.directory().remove(parent, slot)?;

        log::info!("removed {} (inode {})", path, slot);
        Ok(())
    }

    /// 移动 / 重命名。父目录不同时先摘下再挂上，名字总是改写成新叶子名。
    pub fn move_entry(&self, old_path: &str, new_path: &str) -> Result<()> {
        let old = Self::parse_non_root(old_path)?;
        let new = Self::parse_non_root(new_path)?;

        let table = self.table();
        let resolver = PathResolver::new(&table);

        let old_parent = resolver.resolve_parent(&old)?;
        let new_parent = resolver.resolve_parent(&new)?;
        let slot = resolver.resolve_leaf(&old, false)?;
        if slot == ROOT_INODE || self.is_within(new_parent, slot)? {
            return Err(FileSystemError::InvalidPath(new.to_string()));
        }

        self.directory().move_child(slot, old_parent, new_parent)?;

        let mut inode = table.read_slot(slot)?;
        inode.rename(new.leaf());
        table.write_slot(slot, &inode)?;

        log::info!("moved {} -> {} (inode {})", old, new, slot);
        Ok(())
    }

    /// `dir` 是否就是 `ancestor`，或者沿父目录链向上能走到 `ancestor`
    fn is_within(&self, dir: usize, ancestor: usize) -> Result<bool> {
        let directory = self.directory();
        let mut current = dir;
        // 步数以槽位总数为上限，已损坏的镜像里可能有环
        for _ in 0..self.layout.num_inodes() {
            if current == ancestor {
                return Ok(true);
            }
            match directory.parent_of(current)? {
                Some(parent) => current = parent,
                None => return Ok(false),
            }
        }
        Ok(false)
    }

    /// 按 direct_blocks 顺序读出文件内容
    pub fn read_file(&self, file_path: &str) -> Result<Vec<u8>> {
        let path = FsPath::parse(file_path)?;
        if path.is_root() {
            return Err(FileSystemError::IsADirectory(path.to_string()));
        }

        let table = self.table();
        let slot = PathResolver::new(&table).resolve_leaf(&path, false)?;
        let inode = table.read_slot(slot)?;
        if inode.is_dir() {
            return Err(FileSystemError::IsADirectory(path.to_string()));
        }

        let block_size = self.layout.block_size();
        let size = inode.size as usize;
        let data = self.data();
        let mut content = Vec::with_capacity(size);
        for (i, &block) in inode.blocks(block_size).iter().enumerate() {
            let len = block_size.min(size - i * block_size);
            content.extend(data.read_block(block, len)?);
        }
        Ok(content)
    }

    fn dir_slot(&self, path: &FsPath) -> Result<usize> {
        if path.is_root() {
            return Ok(ROOT_INODE);
        }
        let table = self.table();
        let resolver = PathResolver::new(&table);
        resolver.find_dir(path.leaf())
    }

    /// 列出目录子项（存储顺序）
    pub fn list_dir(&self, dir_path: &str) -> Result<Vec<DirEntry>> {
        let path = FsPath::parse(dir_path)?;
        self.directory().list(self.dir_slot(&path)?)
    }

    pub fn stat(&self, target_path: &str) -> Result<(usize, Inode)> {
        let path = FsPath::parse(target_path)?;
        let table = self.table();
        let slot = if path.is_root() {
            ROOT_INODE
        } else {
            PathResolver::new(&table).resolve_leaf(&path, false)?
        };
        Ok((slot, table.read_slot(slot)?))
    }

    pub fn usage(&self) -> Result<Usage> {
        Ok(Usage {
            block_size: self.layout.block_size(),
            used_blocks: self.data().bitmap().used_count()?,
            total_blocks: self.layout.num_blocks(),
            used_inodes: self.table().used()?.len(),
            total_inodes: self.layout.num_inodes(),
        })
    }

    pub fn check(&self) -> Result<CheckReport> {
        check::check(&self.disk, self.layout)
    }
}
