use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Accepts any document whose root is `TEI` in the TEI namespace
pub const TEI_ROOT_RNG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<grammar xmlns="http://relaxng.org/ns/structure/1.0">
  <start>
    <element>
      <name ns="http://www.tei-c.org/ns/1.0">TEI</name>
      <zeroOrMore>
        <choice><text/><ref name="anyElement"/></choice>
      </zeroOrMore>
    </element>
  </start>
  <define name="anyElement">
    <element>
      <anyName/>
      <zeroOrMore>
        <choice><attribute><anyName/></attribute><text/><ref name="anyElement"/></choice>
      </zeroOrMore>
    </element>
  </define>
</grammar>"#;

/// A TEI document whose body holds `body` verbatim
pub fn tei_document(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <teiHeader><fileDesc><titleStmt><title>Test</title></titleStmt></fileDesc></teiHeader>
  <text>
    <body>
      {}
    </body>
  </text>
</TEI>"#,
        body
    )
}

/// A TEI document with a single edition division holding `edition`
pub fn edition_document(edition: &str) -> String {
    tei_document(&format!(r#"<div type="edition">{}</div>"#, edition))
}

/// Schema-invalid but well-formed: the root is not in the TEI namespace
pub fn invalid_document(edition: &str) -> String {
    format!(
        r#"<TEI><text><body><div xmlns="http://www.tei-c.org/ns/1.0" type="edition">{}</div></body></text></TEI>"#,
        edition
    )
}

/// `document` re-declared as ISO-8859-1 and encoded that way
pub fn latin1_bytes(document: &str) -> Vec<u8> {
    document
        .replace(r#"encoding="UTF-8""#, r#"encoding="ISO-8859-1""#)
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap())
        .collect()
}

/// `document` re-declared as UTF-16 and encoded little-endian with a BOM
pub fn utf16le_bytes(document: &str) -> Vec<u8> {
    let document = document.replace(r#"encoding="UTF-8""#, r#"encoding="UTF-16""#);
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(document.encode_utf16().flat_map(u16::to_le_bytes));
    bytes
}

/// Temporary corpus tree plus a schema file next to it
pub struct TestCorpus {
    dir: TempDir,
}

impl TestCorpus {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("corpus")).unwrap();
        fs::write(dir.path().join("tei-epidoc.rng"), TEI_ROOT_RNG).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("corpus")
    }

    pub fn schema_path(&self) -> PathBuf {
        self.dir.path().join("tei-epidoc.rng")
    }

    /// Directory holding the corpus and the schema
    pub fn workdir(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` at `relative` below the corpus root
    pub fn add(&self, relative: &str, contents: &str) -> &Self {
        self.add_bytes(relative, contents.as_bytes())
    }

    pub fn add_bytes(&self, relative: &str, contents: &[u8]) -> &Self {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
        self
    }
}
