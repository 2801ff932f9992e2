use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use flate2::{read::DeflateDecoder, Crc};
use hues_core::{base_name, is_metadata_file, RespackId};
use tracing::{instrument, trace};
use zip::{result::ZipError, CompressionMethod, ZipArchive};

use super::{ContainerListing, FileOpener, MetadataDocument};
use crate::error::{RespackError, Result};

/// The archive file of a zip backed respack, shared by every opener of the pack.
/// The lock only guards taking a reference to the file: entries are read and
/// decompressed by each stream on its own.
#[derive(Debug, Clone)]
pub(crate) struct ZipHandle {
    id: RespackId,
    file: Arc<Mutex<Option<Arc<File>>>>,
}

/// Where the data of one archive member lives, read from its headers once while listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ZipEntry {
    data_start: u64,
    compressed_size: u64,
    size: u64,
    crc32: u32,
    deflated: bool,
}

impl ZipHandle {
    fn new(id: RespackId, file: File) -> Self {
        Self {
            id,
            file: Arc::new(Mutex::new(Some(Arc::new(file)))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<File>>> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn open_entry(&self, entry: ZipEntry) -> Result<ZipEntryReader> {
        let file = self.lock().clone().ok_or_else(|| RespackError::Closed {
            id: self.id.to_string(),
        })?;
        Ok(ZipEntryReader::new(file, entry))
    }

    /// Returns false when the archive was already closed. Streams that are
    /// still open keep the file alive until they are dropped.
    pub(crate) fn close(&self) -> bool {
        self.lock().take().is_some()
    }
}

/// Reads `file` from its own position, without touching the cursor of the file
/// or of any other reader of the same file.
#[derive(Debug)]
struct PositionedReader {
    file: Arc<File>,
    pos: u64,
    end: u64,
}

impl PositionedReader {
    fn new(file: Arc<File>, start: u64, len: u64) -> Self {
        Self {
            file,
            pos: start,
            end: start.saturating_add(len),
        }
    }
}

impl Read for PositionedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.end.saturating_sub(self.pos);
        let max = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        if max == 0 {
            return Ok(0);
        }
        let read = read_at(&self.file, &mut buf[..max], self.pos)?;
        self.pos += read as u64;
        Ok(read)
    }
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::unix::fs::FileExt::read_at(file, buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::windows::fs::FileExt::seek_read(file, buf, offset)
}

#[derive(Debug)]
enum EntryData {
    Stored(PositionedReader),
    Deflated(DeflateDecoder<PositionedReader>),
}

/// Decompressed content of one archive member.
///
/// Stored members seek directly. Deflated members decompress on seek: forward
/// seeks skip, backward seeks restart the decoder from the member start.
/// The crc32 is checked when the member is read through from its start.
#[derive(Debug)]
pub(crate) struct ZipEntryReader {
    file: Arc<File>,
    entry: ZipEntry,
    data: EntryData,
    /// position in the decompressed content
    pos: u64,
    /// `None` once the stream was seeked, a partial checksum means nothing
    crc: Option<Crc>,
}

impl ZipEntryReader {
    fn new(file: Arc<File>, entry: ZipEntry) -> Self {
        let data = Self::data_from_start(&file, entry);
        Self {
            file,
            entry,
            data,
            pos: 0,
            crc: Some(Crc::new()),
        }
    }

    fn data_from_start(file: &Arc<File>, entry: ZipEntry) -> EntryData {
        let raw = PositionedReader::new(Arc::clone(file), entry.data_start, entry.compressed_size);
        if entry.deflated {
            EntryData::Deflated(DeflateDecoder::new(raw))
        } else {
            EntryData::Stored(raw)
        }
    }

    pub(crate) fn len(&self) -> u64 {
        self.entry.size
    }

    fn skip(&mut self, count: u64) -> io::Result<()> {
        let skipped = io::copy(&mut self.by_ref().take(count), &mut io::sink())?;
        if skipped < count {
            // past the end, reads return nothing from here
            self.pos += count - skipped;
        }
        Ok(())
    }
}

impl Read for ZipEntryReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.entry.size.saturating_sub(self.pos);
        let max = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        if max == 0 {
            return Ok(0);
        }
        let read = match &mut self.data {
            EntryData::Stored(raw) => raw.read(&mut buf[..max])?,
            EntryData::Deflated(decoder) => decoder.read(&mut buf[..max])?,
        };
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "zip member is shorter than its declared size",
            ));
        }
        self.pos += read as u64;
        if let Some(crc) = &mut self.crc {
            crc.update(&buf[..read]);
            if self.pos == self.entry.size && crc.sum() != self.entry.crc32 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "invalid checksum for zip member",
                ));
            }
        }
        Ok(read)
    }
}

impl Seek for ZipEntryReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(offset) => self.entry.size.checked_add_signed(offset),
            SeekFrom::Current(offset) => self.pos.checked_add_signed(offset),
        }
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )
        })?;
        if target == self.pos {
            return Ok(target);
        }
        self.crc = None;
        if let EntryData::Stored(raw) = &mut self.data {
            raw.pos = self.entry.data_start.saturating_add(target);
            self.pos = target;
            return Ok(target);
        }
        if target < self.pos {
            self.data = Self::data_from_start(&self.file, self.entry);
            self.pos = 0;
        }
        self.skip(target - self.pos)?;
        Ok(target)
    }
}

/// Lists a zip archive. Member paths are reduced to their base name.
#[instrument(skip(file))]
pub(crate) fn list_zip(
    id: &RespackId,
    path: &str,
    file: File,
) -> Result<(ContainerListing, ZipHandle)> {
    let mut archive = ZipArchive::new(file).map_err(|e| RespackError::container(path, e))?;
    let mut listing = ContainerListing::default();
    // members are collected first, openers need the file moved into its shared handle
    let mut members = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| RespackError::container(path, e))?;
        if entry.is_dir() {
            continue;
        }
        let entry_name = entry.name().to_owned();
        if is_metadata_file(&entry_name) {
            let mut bytes = Vec::new();
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| RespackError::metadata(&entry_name, e))?;
            listing.documents.push(MetadataDocument {
                path: entry_name,
                bytes,
            });
        } else {
            let deflated = match entry.compression() {
                CompressionMethod::Stored => false,
                CompressionMethod::Deflated => true,
                _ => {
                    return Err(RespackError::container(
                        path,
                        ZipError::UnsupportedArchive("Compression method not supported"),
                    ))
                }
            };
            trace!(%entry_name, index, deflated, "asset");
            members.push((
                base_name(&entry_name).to_owned(),
                ZipEntry {
                    // known once `by_index` has read the local header
                    data_start: entry.data_start(),
                    compressed_size: entry.compressed_size(),
                    size: entry.size(),
                    crc32: entry.crc32(),
                    deflated,
                },
            ));
        }
    }

    let handle = ZipHandle::new(id.clone(), archive.into_inner());
    for (name, entry) in members {
        listing.insert_file(
            name,
            FileOpener::Zip {
                archive: handle.clone(),
                entry,
            },
        );
    }
    Ok((listing, handle))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use zip::{write::FileOptions, ZipWriter};

    fn archive(members: &[(&str, &[u8], CompressionMethod)]) -> File {
        let mut file = tempfile::tempfile().unwrap();
        let mut writer = ZipWriter::new(&mut file);
        for (name, content, method) in members {
            writer
                .start_file(*name, FileOptions::default().compression_method(*method))
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
        drop(writer);
        file
    }

    fn open(listing: &ContainerListing, name: &str) -> ZipEntryReader {
        match &listing.files[name] {
            FileOpener::Zip { archive, entry } => archive.open_entry(*entry).unwrap(),
            other => panic!("{name} is not a zip member: {other:?}"),
        }
    }

    fn content(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[rstest::rstest]
    fn test_seek_within_member(
        #[values(CompressionMethod::Stored, CompressionMethod::Deflated)] method: CompressionMethod,
    ) {
        let big = content(200_000);
        let file = archive(&[("noise.bin", &big, method)]);
        let (listing, _handle) = list_zip(&RespackId::from_path("pack.zip"), "pack.zip", file).unwrap();
        let mut reader = open(&listing, "noise.bin");
        assert_eq!(reader.len(), big.len() as u64);

        let mut chunk = [0u8; 16];
        reader.seek(SeekFrom::Start(150_000)).unwrap();
        reader.read_exact(&mut chunk).unwrap();
        assert_eq!(&chunk[..], &big[150_000..150_016]);

        reader.seek(SeekFrom::Current(-10_016)).unwrap();
        reader.read_exact(&mut chunk).unwrap();
        assert_eq!(&chunk[..], &big[140_000..140_016]);

        assert_eq!(reader.seek(SeekFrom::End(-4)).unwrap(), 199_996);
        let mut tail = Vec::new();
        reader.read_to_end(&mut tail).unwrap();
        assert_eq!(&tail[..], &big[199_996..]);

        assert_eq!(reader.seek(SeekFrom::End(10)).unwrap(), 200_010);
        assert_eq!(reader.read(&mut chunk).unwrap(), 0);
        assert!(reader.seek(SeekFrom::Current(-300_000)).is_err());
    }

    #[test]
    fn test_streams_do_not_wait_for_each_other() {
        let big = content(1 << 20);
        let file = archive(&[
            ("big.bin", &big, CompressionMethod::Deflated),
            ("small.txt", b"small", CompressionMethod::Deflated),
        ]);
        let (listing, handle) =
            list_zip(&RespackId::from_path("pack.zip"), "pack.zip", file).unwrap();

        let mut big_reader = open(&listing, "big.bin");
        let mut head = vec![0u8; 4096];
        big_reader.read_exact(&mut head).unwrap();

        // the big member is half read while the small one is opened, read and closed
        let small = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let mut small = String::new();
                    open(&listing, "small.txt").read_to_string(&mut small).unwrap();
                    small
                })
                .join()
                .unwrap()
        });
        assert_eq!(small, "small");

        assert!(handle.close());
        let mut rest = Vec::new();
        big_reader.read_to_end(&mut rest).unwrap();
        head.extend(rest);
        assert_eq!(head.len(), big.len());
        assert!(head == big);

        match &listing.files["small.txt"] {
            FileOpener::Zip { archive, entry } => {
                assert!(matches!(archive.open_entry(*entry), Err(RespackError::Closed { .. })))
            }
            other => panic!("not a zip member: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_corrupted_member_fails_checksum() {
        let file = archive(&[("note.txt", b"hello hues", CompressionMethod::Stored)]);
        let (listing, _handle) =
            list_zip(&RespackId::from_path("pack.zip"), "pack.zip", file.try_clone().unwrap())
                .unwrap();
        let FileOpener::Zip { entry, .. } = &listing.files["note.txt"] else {
            panic!("not a zip member");
        };
        std::os::unix::fs::FileExt::write_at(&file, b"J", entry.data_start).unwrap();

        let mut text = String::new();
        let err = open(&listing, "note.txt").read_to_string(&mut text).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
