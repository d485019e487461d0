//! Fixed-length strings shown on the title screen

use crate::error::FormatResult;
use crate::layout::{HELP_PROMPT_TEXT_OFFSET, SUBTITLE_TEXT_OFFSET, TITLE_TEXT_OFFSET};
use crate::source::ByteSource;

/// Location and size of one string in the executable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextField {
    /// Short name used in logs
    pub name: &'static str,
    /// File offset of the string
    pub offset: u64,
    /// Length of the field in bytes
    pub max_len: usize,
    /// Output file name
    pub file_name: &'static str,
}

impl TextField {
    /// Seek to the field and read it
    pub fn read<S: ByteSource>(&self, mut source: S) -> FormatResult<String> {
        source.seek(self.offset)?;
        source.read_fixed_string(self.max_len)
    }
}

/// Every string the extractor knows about
pub const TEXT_FIELDS: [TextField; 3] = [
    TextField {
        name: "title",
        offset: TITLE_TEXT_OFFSET,
        max_len: 0xe,
        file_name: "title.txt",
    },
    TextField {
        name: "subtitle",
        offset: SUBTITLE_TEXT_OFFSET,
        max_len: 0x17,
        file_name: "subtitle.txt",
    },
    TextField {
        name: "help prompt",
        offset: HELP_PROMPT_TEXT_OFFSET,
        max_len: 25,
        file_name: "helpprompt.txt",
    },
];
