// Integration test utilities
//
// Fixture files are written into a temporary directory that lives as long as
// the returned guard.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A temporary directory holding fixture files
pub struct Fixtures {
    dir: TempDir,
}

impl Fixtures {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Write `content` to `name` inside the fixture directory
    pub fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    /// Path inside the fixture directory without creating it
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// One received message answered five minutes later
pub const SINGLE_REPLY_CSV: &str = "\
timestamp,phone_number,message_type,message_content
2024-01-01 12:00:00,555-1234,received,are you there?
2024-01-01 12:05:00,555-1234,sent,yes
";

/// Heterogeneous headers and phone spellings with a delayed reply that stands out
pub const OUTLIER_CSV: &str = "\
Direction,Date,Phone,Body
Incoming,2024-01-01 08:00:00,(555) 000-1111,a
Outgoing,2024-01-01 08:01:00,(555) 000-1111,b
Incoming,2024-01-02 08:00:00,(555) 000-1111,c
Outgoing,2024-01-02 08:02:00,(555) 000-1111,d
Incoming,2024-01-03 08:00:00,(555) 000-1111,e
Outgoing,2024-01-03 08:01:00,(555) 000-1111,f
Incoming,2024-01-04 08:00:00,(555) 000-1111,g
Outgoing,2024-01-04 08:02:00,(555) 000-1111,h
Incoming,2024-01-05 08:00:00,(555) 000-1111,i
Outgoing,2024-01-05 18:00:00,555.000.1111,j
";

/// Headers nothing in the default vocabulary matches
pub const UNMAPPABLE_CSV: &str = "\
foo,bar,baz
1,2,3
";
