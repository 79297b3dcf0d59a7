mod common;

use common::{assert_consistent, children, formatted, inode, names, used_blocks};
use minifs::{FileSystem, FileSystemError, Inconsistency, Inode};

#[test]
fn format_leaves_an_empty_root() {
    let fs = formatted(4, 8, 4);

    let root = inode(&fs, 0);
    assert!(root.is_used());
    assert!(root.is_dir());
    assert_eq!(root.name(), "/");
    assert_eq!(root.size, 0);
    assert_eq!(used_blocks(&fs), vec![0]);
    for slot in 1..4 {
        assert!(!inode(&fs, slot).is_used());
    }
    assert!(fs.list_dir("/").unwrap().is_empty());
    assert_consistent(&fs);
}

#[test]
fn format_writes_the_documented_byte_layout() {
    let fs = formatted(4, 8, 4);
    let bytes = fs.disk().snapshot();

    assert_eq!(bytes.len(), 3 + 1 + 4 * 22 + 1 + 8 * 4);
    assert_eq!(&bytes[..3], &[4, 8, 4]);
    assert_eq!(bytes[3], 0b0000_0001);

    let root = &bytes[4..26];
    assert_eq!(&root[..3], &[1, 1, b'/']);
    assert!(root[3..].iter().all(|&b| b == 0));

    // 其余槽位、根索引字节和数据区全是 0
    assert!(bytes[26..].iter().all(|&b| b == 0));
}

#[test]
fn create_file_allocates_blocks_and_links_into_root() {
    let fs = formatted(4, 8, 4);
    let slot = fs.create_file("/a.txt", b"hello").unwrap();

    assert_eq!(slot, 1);
    let file = inode(&fs, slot);
    assert!(!file.is_dir());
    assert_eq!(file.name(), "a.txt");
    assert_eq!(file.size, 5);
    assert_eq!(file.blocks(4), &[1, 2]);
    assert_eq!(inode(&fs, 0).size, 1);
    assert_eq!(children(&fs, 0), vec![1]);
    assert_eq!(used_blocks(&fs), vec![0, 1, 2]);
    assert_eq!(fs.read_file("/a.txt").unwrap(), b"hello");
    assert_consistent(&fs);
}

#[test]
fn content_round_trips_at_every_length() {
    let fs = formatted(4, 64, 16);
    // 4 字节块时根目录最多 12 个子项
    for len in 0..12 {
        let content: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(37)).collect();
        let path = format!("/f{}", len);
        fs.create_file(&path, &content).unwrap();
        assert_eq!(fs.read_file(&path).unwrap(), content, "length {}", len);
    }
    assert_consistent(&fs);
}

#[test]
fn remove_file_frees_blocks_and_slot() {
    let fs = formatted(4, 8, 4);
    fs.create_file("/a.txt", b"hello").unwrap();
    fs.remove("/a.txt").unwrap();

    assert_eq!(inode(&fs, 1), Inode::empty());
    assert_eq!(inode(&fs, 0).size, 0);
    assert!(children(&fs, 0).is_empty());
    // 根目录保留唯一的块
    assert_eq!(used_blocks(&fs), vec![0]);
    assert!(matches!(
        fs.read_file("/a.txt"),
        Err(FileSystemError::NotFound(_))
    ));
    assert_consistent(&fs);
}

#[test]
fn move_reparents_without_touching_content() {
    let fs = formatted(4, 8, 4);
    let file = fs.create_file("/a.txt", b"hello").unwrap();
    let dir = fs.create_directory("/d").unwrap();
    let before = inode(&fs, file);

    fs.move_entry("/a.txt", "/d/a.txt").unwrap();

    assert_eq!(children(&fs, 0), vec![dir]);
    assert_eq!(children(&fs, dir), vec![file]);
    assert_eq!(inode(&fs, file), before);
    assert_eq!(fs.read_file("/d/a.txt").unwrap(), b"hello");
    assert_eq!(names(&fs, "/d"), vec!["a.txt"]);
    assert_consistent(&fs);
}

#[test]
fn rename_in_place_changes_only_the_name() {
    let fs = formatted(4, 8, 4);
    fs.create_directory("/a").unwrap();
    let slot = fs.create_file("/a/x", b"hi").unwrap();

    fs.move_entry("/a/x", "/a/renamed_long_name").unwrap();

    let file = inode(&fs, slot);
    assert_eq!(file.name(), "renamed_lo");
    assert_eq!(file.size, 2);
    assert_eq!(names(&fs, "/a"), vec!["renamed_lo"]);
    assert_consistent(&fs);
}

#[test]
fn moving_onto_the_same_path_changes_nothing() {
    let fs = formatted(4, 8, 4);
    fs.create_directory("/a").unwrap();
    fs.create_file("/a/x", b"data").unwrap();
    let before = fs.disk().snapshot();

    fs.move_entry("/a/x", "/a/x").unwrap();

    assert_eq!(fs.disk().snapshot(), before);
}

#[test]
fn oversized_file_is_rejected_before_allocating() {
    let fs = formatted(4, 32, 4);

    let err = fs.create_file("/big", &[7u8; 13]).unwrap_err();
    assert!(matches!(err, FileSystemError::FileTooLarge { len: 13, max: 12 }));
    assert_eq!(used_blocks(&fs), vec![0]);

    fs.create_file("/max", &[7u8; 12]).unwrap();
    assert_eq!(used_blocks(&fs), vec![0, 1, 2, 3]);
    assert_eq!(fs.read_file("/max").unwrap(), vec![7u8; 12]);
}

#[test]
fn size_field_caps_large_blocks() {
    let fs = formatted(200, 4, 4);
    assert!(matches!(
        fs.create_file("/big", &[1u8; 256]),
        Err(FileSystemError::FileTooLarge { max: 255, .. })
    ));
    fs.create_file("/ok", &[1u8; 255]).unwrap();
    assert_eq!(fs.read_file("/ok").unwrap().len(), 255);
}

#[test]
fn running_out_of_blocks() {
    let fs = formatted(4, 2, 8);
    fs.create_file("/f", b"abcd").unwrap();

    assert!(matches!(
        fs.create_directory("/d"),
        Err(FileSystemError::NoFreeBlocks)
    ));
    assert_eq!(fs.usage().unwrap().used_inodes, 2);
    assert_consistent(&fs);
}

#[test]
fn failed_create_leaks_its_blocks() {
    let fs = formatted(4, 8, 2);
    fs.create_file("/f", b"abc").unwrap();

    assert!(matches!(
        fs.create_file("/g", b"xyz"),
        Err(FileSystemError::NoFreeInodes)
    ));

    // 块在找 inode 槽位之前就分配了，失败后不回收
    assert_eq!(used_blocks(&fs), vec![0, 1, 2]);
    let report = fs.check().unwrap();
    assert_eq!(report.problems, vec![Inconsistency::LeakedBlock(2)]);
}

#[test]
fn full_directory_leaves_an_unlinked_inode() {
    let fs = formatted(1, 16, 8);
    for name in ["/f1", "/f2", "/f3"] {
        fs.create_file(name, b"").unwrap();
    }
    assert_eq!(inode(&fs, 0).blocks(1), &[0, 1, 2]);

    assert!(matches!(
        fs.create_file("/f4", b""),
        Err(FileSystemError::DirectoryFull)
    ));
    assert_eq!(children(&fs, 0), vec![1, 2, 3]);
    // 追加失败前 inode 已经写入
    let (slot, orphan) = fs.stat("/f4").unwrap();
    assert_eq!(slot, 4);
    assert!(orphan.is_used());
    let report = fs.check().unwrap();
    assert_eq!(report.problems, vec![Inconsistency::UnreachableInode(4)]);
}

#[test]
fn parent_growth_fails_when_no_block_is_left() {
    // 1 字节块：根目录有一个子项时唯一的块就满了
    let fs = formatted(1, 2, 8);
    fs.create_file("/a", b"x").unwrap();
    assert_eq!(used_blocks(&fs), vec![0, 1]);

    assert!(matches!(
        fs.create_file("/e", b""),
        Err(FileSystemError::NoFreeBlocks)
    ));

    let root = inode(&fs, 0);
    assert_eq!(root.size, 1);
    assert_eq!(root.direct_blocks, [0, 0, 0]);
    assert_eq!(children(&fs, 0), vec![1]);
    // 父目录扩块之前 inode 已经写入
    let orphan = inode(&fs, 2);
    assert!(orphan.is_used());
    assert_eq!(orphan.name(), "e");
    assert_eq!(
        fs.check().unwrap().problems,
        vec![Inconsistency::UnreachableInode(2)]
    );
}

#[test]
fn removing_a_child_compacts_the_parent() {
    let fs = formatted(2, 8, 8);
    for name in ["/a", "/b", "/c"] {
        fs.create_file(name, b"").unwrap();
    }
    let d = fs.create_directory("/d").unwrap();
    assert_eq!(inode(&fs, 0).blocks(2), &[0, 1]);

    fs.move_entry("/a", "/d/a").unwrap();
    assert_eq!(children(&fs, 0), vec![2, 3, 4]);

    fs.remove("/b").unwrap();
    assert_eq!(children(&fs, 0), vec![3, d]);
    let root = inode(&fs, 0);
    assert_eq!(root.size, 2);
    assert_eq!(root.direct_blocks, [0, 0, 0]);
    assert_eq!(used_blocks(&fs), vec![0, 2]);
    assert_eq!(children(&fs, d), vec![1]);
    assert_consistent(&fs);
}

#[test]
fn directory_size_matches_decoded_entries() {
    let fs = formatted(2, 32, 16);
    fs.create_directory("/d").unwrap();
    for i in 0..5 {
        fs.create_file(&format!("/d/f{}", i), b"x").unwrap();
    }
    fs.remove("/d/f2").unwrap();
    fs.move_entry("/d/f4", "/f4").unwrap();

    for dir in ["/", "/d"] {
        let (slot, dir_inode) = fs.stat(dir).unwrap();
        assert_eq!(children(&fs, slot).len(), dir_inode.size as usize);
        assert_eq!(fs.list_dir(dir).unwrap().len(), dir_inode.size as usize);
    }
    assert_eq!(names(&fs, "/d"), vec!["f0", "f1", "f3"]);
    assert_consistent(&fs);
}

#[test]
fn non_empty_directory_is_not_removed() {
    let fs = formatted(4, 8, 4);
    fs.create_directory("/d").unwrap();
    fs.create_file("/d/x", b"").unwrap();
    let before = fs.disk().snapshot();

    assert!(matches!(
        fs.remove("/d"),
        Err(FileSystemError::DirectoryNotEmpty(_))
    ));
    assert_eq!(fs.disk().snapshot(), before);

    fs.remove("/d/x").unwrap();
    fs.remove("/d").unwrap();
    assert_eq!(used_blocks(&fs), vec![0]);
    assert_consistent(&fs);
}

#[test]
fn names_resolve_globally() {
    let fs = formatted(8, 16, 8);
    fs.create_directory("/d").unwrap();
    let nested = fs.create_file("/d/n", b"hey").unwrap();

    // 查找只看叶子名
    assert_eq!(fs.read_file("/n").unwrap(), b"hey");
    assert_eq!(fs.read_file("/elsewhere/n").unwrap(), b"hey");

    // 允许重名，但总是命中第一个槽位
    fs.create_file("/n", b"top").unwrap();
    assert_eq!(fs.stat("/n").unwrap().0, nested);
    assert_eq!(fs.read_file("/n").unwrap(), b"hey");
}

#[test]
fn bad_paths_and_missing_parents() {
    let fs = formatted(4, 8, 4);
    fs.create_file("/file", b"").unwrap();

    assert!(matches!(
        fs.create_file("relative", b""),
        Err(FileSystemError::InvalidPath(_))
    ));
    assert!(matches!(fs.remove("/"), Err(FileSystemError::InvalidPath(_))));
    assert!(matches!(
        fs.create_directory("/nope/d"),
        Err(FileSystemError::NotFound(_))
    ));
    assert!(matches!(
        fs.create_file("/file/x", b""),
        Err(FileSystemError::NotADirectory(_))
    ));
    assert!(matches!(
        fs.read_file("/"),
        Err(FileSystemError::IsADirectory(_))
    ));
    assert!(matches!(
        fs.move_entry("/missing", "/m"),
        Err(FileSystemError::NotFound(_))
    ));
}

#[test]
fn directory_cannot_be_moved_into_itself() {
    let fs = formatted(4, 8, 4);
    fs.create_directory("/d").unwrap();
    assert!(matches!(
        fs.move_entry("/d", "/d/d"),
        Err(FileSystemError::InvalidPath(_))
    ));
    assert_consistent(&fs);
}

#[test]
fn directory_cannot_be_moved_under_a_descendant() {
    let fs = formatted(4, 16, 8);
    let d = fs.create_directory("/d").unwrap();
    let e = fs.create_directory("/d/e").unwrap();
    fs.create_directory("/d/e/f").unwrap();
    let before = fs.disk().snapshot();

    for target in ["/d/e/d", "/d/e/f/d"] {
        assert!(matches!(
            fs.move_entry("/d", target),
            Err(FileSystemError::InvalidPath(_))
        ));
    }
    assert_eq!(fs.disk().snapshot(), before);
    assert_eq!(children(&fs, 0), vec![d]);
    assert_eq!(children(&fs, d), vec![e]);

    // 反方向移动没问题
    fs.move_entry("/d/e/f", "/f").unwrap();
    assert_eq!(names(&fs, "/"), vec!["d", "f"]);
    assert_consistent(&fs);
}

#[test]
fn check_reports_a_detached_cycle() {
    let fs = formatted(4, 16, 8);
    let d = fs.create_directory("/d").unwrap();
    let e = fs.create_directory("/d/e").unwrap();

    // 手动把 d 挂到 e 下面，同时从根目录摘掉
    fs.directory().move_child(d, 0, e).unwrap();

    let report = fs.check().unwrap();
    assert_eq!(
        report.problems,
        vec![
            Inconsistency::UnreachableInode(d),
            Inconsistency::UnreachableInode(e),
        ]
    );
}

#[test]
fn reopen_reads_geometry_from_superblock() {
    let fs = formatted(4, 8, 4);
    fs.create_directory("/d").unwrap();
    fs.create_file("/d/a", b"persist").unwrap();

    let fs = FileSystem::open(fs.into_disk()).unwrap();
    assert_eq!(fs.layout().block_size(), 4);
    assert_eq!(fs.layout().num_inodes(), 4);
    assert_eq!(fs.read_file("/d/a").unwrap(), b"persist");
    let usage = fs.usage().unwrap();
    assert_eq!((usage.used_blocks, usage.used_inodes), (4, 3));
}
