//! Konverteringstjänsten: från .ftz-arkiv till .ged-fil
//!
//! Kör hela kedjan arkiv → tolkning → relationsupplösning → GEDCOM-fil
//! och samlar utfallet i en rapport. Vid batchkörning isoleras felen,
//! ett trasigt arkiv stoppar inte de övriga.

use std::path::{Path, PathBuf};

use crate::ftz::{FtzArchive, FtzParser};
use crate::gedcom::GedcomWriter;
use crate::models::TreeData;
use crate::utils::error::{ConvertError, ConvertResult};

use super::resolver::RelationshipResolver;

/// Inställningar för en konverteringsomgång
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Skriv utfilerna hit i stället för bredvid arkiven
    pub out_dir: Option<PathBuf>,
    /// Skriv den upplösta modellen som JSON bredvid varje GEDCOM-fil
    pub json_sidecar: bool,
}

/// Rapport för ett konverterat arkiv
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub persons: usize,
    pub families: usize,
    pub media_refs: usize,
    pub warnings: Vec<String>,
}

impl ConversionReport {
    pub fn summary(&self) -> String {
        let mut s = format!(
            "{} personer, {} familjer, {} mediereferenser",
            self.persons, self.families, self.media_refs
        );
        match self.warnings.len() {
            0 => {}
            1 => s.push_str(" (1 varning)"),
            n => s.push_str(&format!(" ({} varningar)", n)),
        }
        s
    }
}

/// Utfallet av en batchkörning
#[derive(Debug, Default)]
pub struct BatchResult {
    pub reports: Vec<ConversionReport>,
    pub failures: Vec<(PathBuf, ConvertError)>,
}

impl BatchResult {
    pub fn all_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            format!("{} arkiv konverterade", self.reports.len())
        } else {
            format!(
                "{} arkiv konverterade, {} misslyckades",
                self.reports.len(),
                self.failures.len()
            )
        }
    }
}

/// Kör konverteringar enligt inställningarna
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Konvertera ett arkiv till en GEDCOM-fil
    pub fn convert_file(&self, input: &Path) -> ConvertResult<ConversionReport> {
        tracing::info!("Konverterar {}", input.display());

        let archive = FtzArchive::open(input)?;
        let ftz = FtzParser::parse(&archive)?;
        let media_refs = ftz.media_count();
        let resolved = RelationshipResolver::resolve(&ftz);

        let output = self.output_path(input)?;
        GedcomWriter::write_file(&resolved.data, &output)?;
        if self.options.json_sidecar {
            self.write_sidecar(&resolved.data, &output)?;
        }

        let report = ConversionReport {
            input: input.to_path_buf(),
            output,
            persons: resolved.data.person_count(),
            families: resolved.data.family_count(),
            media_refs,
            warnings: resolved.warnings,
        };
        tracing::info!("Klar: {}", report.summary());
        Ok(report)
    }

    /// Konvertera flera arkiv i tur och ordning
    pub fn convert_all(&self, inputs: &[PathBuf]) -> BatchResult {
        let mut result = BatchResult::default();
        for input in inputs {
            match self.convert_file(input) {
                Ok(report) => result.reports.push(report),
                Err(err) => {
                    tracing::error!("{}: {}", input.display(), err);
                    result.failures.push((input.clone(), err));
                }
            }
        }
        result
    }

    fn output_path(&self, input: &Path) -> ConvertResult<PathBuf> {
        match &self.options.out_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| {
                    ConvertError::write_failure(format!(
                        "kunde inte skapa {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
                let file_name = input.file_name().ok_or_else(|| {
                    ConvertError::write_failure(format!("ogiltig sökväg: {}", input.display()))
                })?;
                Ok(dir.join(file_name).with_extension("ged"))
            }
            None => Ok(input.with_extension("ged")),
        }
    }

    /// Den upplösta modellen hamnar bredvid GEDCOM-filen som `<namn>.ged.json`,
    /// med alla personer och familjer i tilldelad id-ordning
    fn write_sidecar(&self, data: &TreeData, ged_path: &Path) -> ConvertResult<()> {
        let json = serde_json::to_string_pretty(data).map_err(|e| {
            ConvertError::write_failure(format!("kunde inte serialisera modellen: {}", e))
        })?;

        let mut path = ged_path.to_path_buf().into_os_string();
        path.push(".json");
        let path = PathBuf::from(path);

        std::fs::write(&path, json).map_err(|e| {
            ConvertError::write_failure(format!("kunde inte skriva {}: {}", path.display(), e))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn row(width: usize, cols: &[(usize, &str)]) -> String {
        let mut fields = vec![String::new(); width];
        for (idx, value) in cols {
            fields[*idx] = value.to_string();
        }
        fields.join("\t")
    }

    /// Två föräldrar, ett barn och ett par med vigseltillägg
    fn sample_payload() -> String {
        let rows = vec![
            "3\t1\t1".to_string(),
            row(29, &[(0, "1"), (12, "Berg"), (13, "Erik"), (16, "1"), (17, "1870"), (24, "1")]),
            row(29, &[(0, "2"), (12, "Dal"), (13, "Maria"), (24, "2")]),
            row(29, &[(0, "3"), (2, "7"), (12, "Berg"), (13, "Nils"), (24, "1")]),
            row(12, &[(0, "7"), (2, "1"), (4, "2")]),
            row(13, &[(0, "1"), (1, "1"), (2, "7"), (3, "5"), (5, "1895"), (11, "Uppsala")]),
        ];
        rows.join("\n")
    }

    fn write_archive(path: &Path, payload: &str) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("träd/node.ftt", SimpleFileOptions::default()).unwrap();
        zip.write_all(payload.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_convert_file_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("familj.ftz");
        write_archive(&input, &sample_payload());

        let converter = Converter::new(ConvertOptions::default());
        let report = converter.convert_file(&input).unwrap();

        assert_eq!(report.persons, 3);
        assert_eq!(report.families, 1);
        assert_eq!(report.media_refs, 0);
        assert!(report.warnings.is_empty());
        assert_eq!(report.output, dir.path().join("familj.ged"));

        let ged = std::fs::read_to_string(&report.output).unwrap();
        assert!(ged.starts_with("0 HEAD\n"));
        assert!(ged.ends_with("0 TRLR\n"));
        assert!(ged.contains("0 @I0000@ INDI\n1 NAME Erik /Berg/\n"));
        assert!(ged.contains("1 BIRT\n2 DATE 1870\n"));
        assert!(ged.contains(
            "0 @F0000@ FAM\n1 HUSB @I0000@\n1 WIFE @I0001@\n1 CHIL @I0002@\n\
             1 MARR\n2 DATE 1895\n2 PLAC Uppsala\n"
        ));
        assert!(ged.contains("1 FAMC @F0000@"));
        assert!(ged.contains("1 FAMS @F0000@"));
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("familj.ftz");
        write_archive(&input, &sample_payload());

        let converter = Converter::new(ConvertOptions::default());
        let first = converter.convert_file(&input).unwrap();
        let bytes_first = std::fs::read(&first.output).unwrap();

        let second = converter.convert_file(&input).unwrap();
        let bytes_second = std::fs::read(&second.output).unwrap();

        assert_eq!(bytes_first, bytes_second);
    }

    #[test]
    fn test_out_dir_is_created_and_used() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("familj.ftz");
        write_archive(&input, &sample_payload());

        let out_dir = dir.path().join("ut").join("ged");
        let converter = Converter::new(ConvertOptions {
            out_dir: Some(out_dir.clone()),
            json_sidecar: false,
        });
        let report = converter.convert_file(&input).unwrap();

        assert_eq!(report.output, out_dir.join("familj.ged"));
        assert!(report.output.exists());
    }

    #[test]
    fn test_json_sidecar_is_model_dump() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("familj.ftz");
        write_archive(&input, &sample_payload());

        let converter = Converter::new(ConvertOptions {
            out_dir: None,
            json_sidecar: true,
        });
        converter.convert_file(&input).unwrap();

        let sidecar = dir.path().join("familj.ged.json");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&sidecar).unwrap()).unwrap();

        let persons = json["persons"].as_array().unwrap();
        assert_eq!(persons.len(), 3);
        assert_eq!(persons[0]["given_name"], "Erik");
        assert_eq!(persons[0]["surname"], "Berg");
        assert_eq!(persons[0]["birth"]["date"]["date"]["year"], 1870);
        assert_eq!(persons[2]["family_child"], 0);

        let families = json["families"].as_array().unwrap();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0]["husband_id"], 0);
        assert_eq!(families[0]["children_ids"][0], 2);
        assert_eq!(families[0]["marriage"]["place"], "Uppsala");
    }

    #[test]
    fn test_batch_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("bra.ftz");
        write_archive(&good, &sample_payload());
        let bad = dir.path().join("trasig.ftz");
        std::fs::write(&bad, b"inte ett arkiv").unwrap();

        let converter = Converter::new(ConvertOptions::default());
        let result = converter.convert_all(&[bad.clone(), good.clone()]);

        assert!(!result.all_ok());
        assert_eq!(result.reports.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].0, bad);
        assert!(matches!(result.failures[0].1, ConvertError::ArchiveCorrupt(_)));
        assert_eq!(result.summary(), "1 arkiv konverterade, 1 misslyckades");
        assert!(good.with_extension("ged").exists());
    }

    #[test]
    fn test_report_summary() {
        let mut report = ConversionReport {
            input: PathBuf::from("a.ftz"),
            output: PathBuf::from("a.ged"),
            persons: 3,
            families: 1,
            media_refs: 2,
            warnings: Vec::new(),
        };
        assert_eq!(report.summary(), "3 personer, 1 familjer, 2 mediereferenser");

        report.warnings.push("en varning".to_string());
        assert_eq!(
            report.summary(),
            "3 personer, 1 familjer, 2 mediereferenser (1 varning)"
        );
    }
}
