use std::{
    fs::File,
    io::{prelude::*, Cursor},
    path::Path,
};

use zip::read::ZipArchive;

use crate::ProcessError;

/// Represents an archive of roms, every file inside of it is a single program.
pub struct RomArchives<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<'a> RomArchives<Cursor<&'a [u8]>> {
    /// Will open the archive stored in the given bytes.
    pub fn from_bytes(data: &'a [u8]) -> Result<Self, ProcessError> {
        Self::new(Cursor::new(data))
    }
}

impl RomArchives<File> {
    /// Will open the archive at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProcessError> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read + Seek> RomArchives<R> {
    /// Will read the index of the archive behind the reader.
    pub fn new(reader: R) -> Result<Self, ProcessError> {
        let archive = ZipArchive::new(reader)?;
        log::debug!("opened a rom archive with {} entries", archive.len());
        Ok(RomArchives { archive })
    }

    /// Will return all the rom names available to be chosen
    pub fn file_names(&self) -> Vec<&str> {
        self.archive.file_names().collect()
    }

    /// Will decompress the rom with the given name from the archive
    pub fn get_file_data(&mut self, name: &str) -> Result<Rom, ProcessError> {
        let mut file = self.archive.by_name(name)?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(Rom::new(name, data))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The raw program, copied verbatim into memory when loaded
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data
    pub fn new<D: Into<Box<[u8]>>>(name: &str, data: D) -> Self {
        Rom {
            name: name.to_string(),
            data: data.into(),
        }
    }

    /// Will read the rom from a single file, the file stem becomes the name.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ProcessError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Rom::new(&name, data))
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::build_opcode;
    use std::io::Write;
    use zip::{write::FileOptions, CompressionMethod, ZipWriter};

    const MAZE: [u8; 34] = [
        0xA2, 0x1E, 0xC2, 0x01, 0x32, 0x01, 0xA2, 0x1A, 0xD0, 0x14, 0x70, 0x04, 0x30, 0x40, 0x12,
        0x00, 0x60, 0x00, 0x71, 0x04, 0x31, 0x20, 0x12, 0x00, 0x12, 0x18, 0x80, 0x40, 0x20, 0x10,
        0x20, 0x40, 0x80, 0x10,
    ];

    const ODD: [u8; 3] = [0x00, 0xE0, 0x12];

    fn archive_bytes() -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, data) in [("MAZE", &MAZE[..]), ("ODD", &ODD[..])] {
            writer.start_file(name, options).expect("start entry");
            writer.write_all(data).expect("write entry");
        }
        writer.finish().expect("finish archive").into_inner()
    }

    #[test]
    fn test_rom_extract() {
        let bytes = archive_bytes();
        let mut ra = RomArchives::from_bytes(&bytes).expect("valid archive");
        let rom = ra.get_file_data("MAZE").expect("rom is present");

        assert_eq!(rom.get_name(), "MAZE");
        assert_eq!(rom.get_data(), &MAZE);
        assert_eq!(build_opcode(rom.get_data(), 0), Ok(0xA21E));

        // odd sized roms are not padded
        let rom = ra.get_file_data("ODD").expect("rom is present");
        assert_eq!(rom.get_data().len(), ODD.len());
    }

    #[test]
    fn test_file_names() {
        let bytes = archive_bytes();
        let ra = RomArchives::from_bytes(&bytes).expect("valid archive");
        let mut files = ra.file_names();
        files.sort_unstable();
        assert_eq!(files, vec!["MAZE", "ODD"]);
    }

    #[test]
    fn test_missing_rom() {
        let bytes = archive_bytes();
        let mut ra = RomArchives::from_bytes(&bytes).expect("valid archive");
        assert!(matches!(
            ra.get_file_data("PONG"),
            Err(ProcessError::Rom(_))
        ));
    }

    #[test]
    fn test_invalid_archive() {
        assert!(matches!(
            RomArchives::from_bytes(&MAZE),
            Err(ProcessError::Rom(_))
        ));
    }

    #[test]
    fn test_rom_from_path() {
        let dir = std::env::temp_dir().join(format!("chip8-engine-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("MAZE.ch8");
        std::fs::write(&path, MAZE).expect("write rom");

        let rom = Rom::from_path(&path).expect("rom is readable");
        assert_eq!(rom.get_name(), "MAZE");
        assert_eq!(rom.get_data(), &MAZE);

        let archive = dir.join("roms.zip");
        std::fs::write(&archive, archive_bytes()).expect("write archive");
        let mut ra = RomArchives::open(&archive).expect("archive is readable");
        assert_eq!(ra.get_file_data("MAZE").expect("rom is present"), rom);

        std::fs::remove_dir_all(&dir).expect("cleanup");
        assert!(matches!(Rom::from_path(&path), Err(ProcessError::Rom(_))));
    }

    #[test]
    fn test_chip_from_rom() {
        let rom = Rom::new("MAZE", MAZE.to_vec());
        let chip = crate::chip8::ChipSet::with_rom(&rom).expect("rom fits");
        assert_eq!(chip.name(), "MAZE");
        assert_eq!(&chip.memory()[0x200..0x200 + MAZE.len()], &MAZE);
    }
}
