//! HLS index (m3u8) writer, finalized or live sliding window

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::types::PlaylistMode;

const KEY_NONE: &str = "#EXT-X-KEY:METHOD=NONE";

/// Encryption descriptor of a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRef {
    pub method: String,
    pub uri: String,
}

#[derive(Debug, Clone)]
struct Entry {
    duration: u64,
    uri: String,
    key: Option<KeyRef>,
    timestamp: String,
}

/// Records one line group per segment. Sequence numbers start at 1.
#[derive(Debug)]
pub struct Playlist {
    path: PathBuf,
    target_duration: u64,
    mode: PlaylistMode,
    uri_prefix: String,
    uri_suffix: String,
    key_prefix: String,
    key_suffix: String,
    sequence: u64,
    out: Option<BufWriter<File>>,
    window: VecDeque<Entry>,
    prev_key_line: String,
}

impl Playlist {
    pub fn new(path: impl Into<PathBuf>, target_duration: u64, mode: PlaylistMode) -> Self {
        Self {
            path: path.into(),
            target_duration,
            mode,
            uri_prefix: String::new(),
            uri_suffix: String::new(),
            key_prefix: String::new(),
            key_suffix: String::new(),
            sequence: 1,
            out: None,
            window: VecDeque::new(),
            prev_key_line: KEY_NONE.to_string(),
        }
    }

    pub fn with_uri_affixes(mut self, prefix: &str, suffix: &str) -> Self {
        self.uri_prefix = prefix.to_string();
        self.uri_suffix = suffix.to_string();
        self
    }

    pub fn with_key_affixes(mut self, prefix: &str, suffix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self.key_suffix = suffix.to_string();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sequence number the next segment will get
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Opens the index and writes its header. Live playlists are only
    /// written once the first segment exists.
    pub fn begin(&mut self) -> io::Result<()> {
        if self.mode == PlaylistMode::Final {
            let mut out = BufWriter::new(File::create(&self.path)?);
            self.write_header(&mut out, 1)?;
            out.flush()?;
            self.out = Some(out);
        }
        Ok(())
    }

    pub fn add_segment(&mut self, duration: u64, uri: &str, key: Option<KeyRef>) -> io::Result<()> {
        self.sequence += 1;
        let entry = Entry {
            duration,
            uri: uri.to_string(),
            key,
            timestamp: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
        };

        match self.mode {
            PlaylistMode::Final => {
                let mut out = self.out.take().ok_or_else(|| {
                    io::Error::other("playlist written before begin()")
                })?;
                let res = self.write_segment(&mut out, &entry).and_then(|_| out.flush());
                self.out = Some(out);
                res
            }
            PlaylistMode::Live { window } => {
                self.window.push_back(entry);
                while self.window.len() > window {
                    if let Some(old) = self.window.pop_front() {
                        debug!("Dropping {} from live window", old.uri);
                        if let Err(e) = fs::remove_file(&old.uri) {
                            warn!("Could not remove old segment {}: {e}", old.uri);
                        }
                    }
                }
                self.rewrite(false)
            }
        }
    }

    /// Closes the index with `#EXT-X-ENDLIST`.
    pub fn end(&mut self) -> io::Result<()> {
        match self.mode {
            PlaylistMode::Final => match self.out.take() {
                Some(mut out) => {
                    writeln!(out, "#EXT-X-ENDLIST")?;
                    out.flush()
                }
                None => Ok(()),
            },
            PlaylistMode::Live { .. } => self.rewrite(true),
        }
    }

    /// Writes the live window to `<index>.tmp`, then renames it over the index.
    fn rewrite(&mut self, endlist: bool) -> io::Result<()> {
        let mut tmp_name = self.path.clone().into_os_string();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);

        let mut out = BufWriter::new(File::create(&tmp)?);
        let first = self.sequence - self.window.len() as u64;
        self.write_header(&mut out, first)?;
        let entries: Vec<Entry> = self.window.iter().cloned().collect();
        for entry in &entries {
            self.write_segment(&mut out, entry)?;
        }
        if endlist {
            writeln!(out, "#EXT-X-ENDLIST")?;
        }
        out.flush()?;
        drop(out);

        fs::rename(&tmp, &self.path)
            .map_err(|e| io::Error::new(e.kind(), format!("Could not rename index file: {e}")))
    }

    fn write_header(&mut self, out: &mut impl Write, first_sequence: u64) -> io::Result<()> {
        writeln!(out, "#EXTM3U")?;
        writeln!(out, "#EXT-X-TARGETDURATION:{}", self.target_duration)?;
        writeln!(out, "#EXT-X-MEDIA-SEQUENCE:{first_sequence}")?;
        self.prev_key_line = KEY_NONE.to_string();
        Ok(())
    }

    fn write_segment(&mut self, out: &mut impl Write, entry: &Entry) -> io::Result<()> {
        let key_line = match &entry.key {
            Some(key) if !key.uri.is_empty() => format!(
                "#EXT-X-KEY:METHOD={},URI=\"{}{}{}\"",
                key.method, self.key_prefix, key.uri, self.key_suffix
            ),
            Some(key) => format!("#EXT-X-KEY:METHOD={}", key.method),
            None => KEY_NONE.to_string(),
        };
        if key_line != self.prev_key_line {
            writeln!(out, "{key_line}")?;
            self.prev_key_line = key_line;
        }

        writeln!(out, "#EXT-X-PROGRAM-DATE-TIME:{}", entry.timestamp)?;
        writeln!(out, "#EXTINF:{},", entry.duration)?;
        writeln!(out, "{}{}{}", self.uri_prefix, entry.uri, self.uri_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path).unwrap().lines().map(str::to_string).collect()
    }

    #[test]
    fn final_playlist_layout() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("out.m3u8");
        let mut pl = Playlist::new(&index, 10, PlaylistMode::Final).with_uri_affixes("http://cdn/", "?v=1");
        pl.begin().unwrap();
        assert_eq!(pl.sequence(), 1);
        pl.add_segment(10, "out-00001.ts", None).unwrap();
        pl.add_segment(7, "out-00002.ts", None).unwrap();
        pl.end().unwrap();

        let l = lines(&index);
        assert_eq!(&l[..3], ["#EXTM3U", "#EXT-X-TARGETDURATION:10", "#EXT-X-MEDIA-SEQUENCE:1"]);
        assert!(l[3].starts_with("#EXT-X-PROGRAM-DATE-TIME:"));
        assert_eq!(l[4], "#EXTINF:10,");
        assert_eq!(l[5], "http://cdn/out-00001.ts?v=1");
        assert_eq!(l[7], "#EXTINF:7,");
        assert_eq!(l.last().unwrap(), "#EXT-X-ENDLIST");
        assert!(!l.iter().any(|x| x.starts_with("#EXT-X-KEY")));
    }

    #[test]
    fn key_line_only_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("enc.m3u8");
        let mut pl = Playlist::new(&index, 10, PlaylistMode::Final).with_key_affixes("keys/", "");
        pl.begin().unwrap();
        let k1 = KeyRef { method: "AES-128".into(), uri: "key-0001.key".into() };
        let k2 = KeyRef { method: "AES-128".into(), uri: "key-0003.key".into() };
        pl.add_segment(10, "a.ts", Some(k1.clone())).unwrap();
        pl.add_segment(10, "b.ts", Some(k1)).unwrap();
        pl.add_segment(10, "c.ts", Some(k2)).unwrap();
        pl.end().unwrap();

        let keys: Vec<String> = lines(&index).into_iter().filter(|l| l.starts_with("#EXT-X-KEY")).collect();
        assert_eq!(
            keys,
            [
                "#EXT-X-KEY:METHOD=AES-128,URI=\"keys/key-0001.key\"",
                "#EXT-X-KEY:METHOD=AES-128,URI=\"keys/key-0003.key\"",
            ]
        );
    }

    #[test]
    fn live_window_slides_and_unlinks() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("live.m3u8");
        let mut pl = Playlist::new(&index, 4, PlaylistMode::Live { window: 2 });
        pl.begin().unwrap();
        assert!(!index.exists());

        let mut names = Vec::new();
        for i in 1..=4 {
            let seg = dir.path().join(format!("seg{i}.ts"));
            fs::write(&seg, b"x").unwrap();
            let name = seg.to_string_lossy().into_owned();
            pl.add_segment(4, &name, None).unwrap();
            names.push(name);
        }

        let l = lines(&index);
        assert!(l.contains(&"#EXT-X-MEDIA-SEQUENCE:3".to_string()));
        assert!(!l.contains(&names[1]));
        assert!(l.contains(&names[2]) && l.contains(&names[3]));
        assert!(!Path::new(&names[0]).exists());
        assert!(!Path::new(&names[1]).exists());
        assert!(Path::new(&names[3]).exists());
        assert!(!l.contains(&"#EXT-X-ENDLIST".to_string()));

        pl.end().unwrap();
        assert_eq!(lines(&index).last().unwrap(), "#EXT-X-ENDLIST");
    }
}
