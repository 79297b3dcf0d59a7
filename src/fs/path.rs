//! 路径解析与按名字查找。
//!
//! 查找只看名字：父目录就是整张 inode 表里第一个名字等于倒数第二个分量的
//! 目录，中间的分量从不逐级走。名字在整个卷里不唯一时，查找结果只是第一个匹配。

use crate::{
    disk::BackingStore,
    fs::{
        config::ROOT_NAME,
        error::{FileSystemError, Result},
        inode_table::InodeTable,
    },
};

/// `/a/b/c` -> `["/", "a", "b", "c"]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsPath {
    components: Vec<String>,
}

impl FsPath {
    pub fn parse(path: &str) -> Result<Self> {
        if !path.starts_with('/') {
            return Err(FileSystemError::InvalidPath(path.to_string()));
        }
        let mut components = vec![ROOT_NAME.to_string()];
        components.extend(
            path.split('/')
                .filter(|part| !part.is_empty())
                .map(str::to_string),
        );
        Ok(Self { components })
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn is_root(&self) -> bool {
        self.components.len() == 1
    }

    /// 叶子名；对 `/` 来说就是根标记本身
    pub fn leaf(&self) -> &str {
        // 至少有根标记这一项
        &self.components[self.components.len() - 1]
    }

    /// 直接父目录名，`/` 没有父目录
    pub fn parent(&self) -> Option<&str> {
        let len = self.components.len();
        (len >= 2).then(|| self.components[len - 2].as_str())
    }
}

impl std::fmt::Display for FsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            return f.write_str(ROOT_NAME);
        }
        for part in &self.components[1..] {
            write!(f, "/{}", part)?;
        }
        Ok(())
    }
}

/// 用全表名字查找解析父目录和叶子的槽位
#[derive(Debug)]
pub struct PathResolver<'a, D: BackingStore> {
    table: &'a InodeTable<'a, D>,
}

impl<'a, D: BackingStore> PathResolver<'a, D> {
    pub fn new(table: &'a InodeTable<'a, D>) -> Self {
        Self { table }
    }

    pub fn resolve_parent(&self, path: &FsPath) -> Result<usize> {
        let parent = path
            .parent()
            .ok_or_else(|| FileSystemError::InvalidPath(path.to_string()))?;
        self.find_dir(parent)
    }

    /// 按名字找目录；只有同名文件时报 `NotADirectory`
    pub fn find_dir(&self, name: &str) -> Result<usize> {
        match self.table.find_by_name(name, true) {
            Err(FileSystemError::NotFound(_)) if self.table.find_by_name(name, false).is_ok() => {
                Err(FileSystemError::NotADirectory(name.to_string()))
            }
            other => other,
        }
    }

    pub fn resolve_leaf(&self, path: &FsPath, require_dir: bool) -> Result<usize> {
        self.table.find_by_name(path.leaf(), require_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_into_root_interior_and_leaf() {
        let path = FsPath::parse("/a/b/c.txt").unwrap();
        assert_eq!(path.components(), &["/", "a", "b", "c.txt"]);
        assert_eq!(path.parent(), Some("b"));
        assert_eq!(path.leaf(), "c.txt");
        assert_eq!(path.to_string(), "/a/b/c.txt");
    }

    #[test]
    fn top_level_parent_is_root() {
        let path = FsPath::parse("/a.txt").unwrap();
        assert_eq!(path.parent(), Some("/"));
    }

    #[test]
    fn root_and_redundant_slashes() {
        let root = FsPath::parse("/").unwrap();
        assert!(root.is_root());
        assert_eq!(root.parent(), None);
        assert_eq!(root.leaf(), "/");

        let path = FsPath::parse("//d///x/").unwrap();
        assert_eq!(path.components(), &["/", "d", "x"]);
        assert_eq!(path.to_string(), "/d/x");
    }

    #[test]
    fn relative_paths_are_rejected() {
        assert!(matches!(
            FsPath::parse("a/b"),
            Err(FileSystemError::InvalidPath(_))
        ));
        assert!(FsPath::parse("").is_err());
    }
}
