//! Radskrivare för GEDCOM-filer
//!
//! Skrivaren håller reda på nivåföljden och bryter långa värden med
//! CONC/CONT så att ingen rad överskrider radbudgeten. Brytpunkter
//! läggs inne i ord eftersom läsare kan trimma mellanslag i radänderna.

/// Längsta tillåtna GEDCOM-rad i byte, radslutet inräknat
pub const MAX_LINE_LEN: usize = 255;

/// Bygger GEDCOM-utdata rad för rad
#[derive(Debug, Default)]
pub struct LineWriter {
    out: String,
    last_level: Option<u8>,
}

impl LineWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inled en post på nivå 0, till exempel `0 @I0004@ INDI`
    pub fn record(&mut self, xref: &str, tag: &str) {
        self.push_line(&format!("0 {} {}", xref, tag));
        self.last_level = Some(0);
    }

    /// Skriv en tagg utan värde
    pub fn tag(&mut self, level: u8, tag: &str) {
        self.check_level(level);
        self.push_line(&format!("{} {}", level, tag));
        self.last_level = Some(level);
    }

    /// Skriv en tagg med värde. Radbrytningar i värdet blir CONT-rader
    /// och för långa rader bryts med CONC, båda en nivå under taggen.
    pub fn value(&mut self, level: u8, tag: &str, value: &str) {
        if value.is_empty() {
            self.tag(level, tag);
            return;
        }
        self.check_level(level);

        let cont_level = level + 1;
        let mut line_level = level;
        let mut line_tag = tag;

        for part in value.split('\n') {
            let mut rest = part;
            loop {
                let prefix = format!("{} {}", line_level, line_tag);
                if rest.is_empty() {
                    self.push_line(&prefix);
                    break;
                }
                // mellanslaget efter taggen och radslutet räknas in i gränsen
                let budget = MAX_LINE_LEN - prefix.len() - 2;
                if rest.len() <= budget {
                    self.push_line(&format!("{} {}", prefix, rest));
                    break;
                }
                let cut = Self::split_index(rest, budget);
                self.push_line(&format!("{} {}", prefix, &rest[..cut]));
                rest = &rest[cut..];
                line_level = cont_level;
                line_tag = "CONC";
            }
            line_level = cont_level;
            line_tag = "CONT";
        }
        self.last_level = Some(level);
    }

    /// Avsluta och hämta utdatan
    pub fn finish(self) -> String {
        self.out
    }

    /// En rad får som mest ligga en nivå under sin föregångare
    fn check_level(&self, level: u8) {
        debug_assert!(
            i16::from(level) <= self.last_level.map_or(0, |last| i16::from(last) + 1),
            "nivå {} kan inte följa på nivå {:?}",
            level,
            self.last_level
        );
    }

    /// Hitta brytpunkten för CONC: på en teckengräns och inte intill
    /// ett mellanslag, om ett sådant läge finns inom budgeten
    fn split_index(text: &str, budget: usize) -> usize {
        let mut cut = budget;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        let fallback = cut;
        while cut > 1 {
            if !text[..cut].ends_with(' ') && !text[cut..].starts_with(' ') {
                return cut;
            }
            cut -= 1;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
        }
        fallback
    }

    fn push_line(&mut self, line: &str) {
        self.out.push_str(line);
        self.out.push('\n');
    }
}
