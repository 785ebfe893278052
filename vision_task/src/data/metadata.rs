/// One row of the dataset manifest, in the fixed 7-column order the CSV
/// uses. Records with an empty `image_id` are dropped at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRecord {
    pub lesion_id: String,
    pub image_id: String,
    pub dx: String,
    pub dx_type: String,
    pub age: String,
    pub sex: String,
    pub localization: String,
}

/// Parses the manifest text into records.
///
/// The first line is the header and the last line is assumed trailing; both
/// are dropped unconditionally. Missing trailing fields parse as empty.
pub fn parse_manifest(text: &str) -> Vec<DatasetRecord> {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() <= 2 {
        return Vec::new();
    }

    lines[1..lines.len() - 1]
        .iter()
        .filter_map(|line| {
            let mut fields = line.split(',');
            let mut next = || fields.next().unwrap_or("").to_string();

            let record = DatasetRecord {
                lesion_id: next(),
                image_id: next(),
                dx: next(),
                dx_type: next(),
                age: next(),
                sex: next(),
                localization: next(),
            };

            (!record.image_id.is_empty()).then_some(record)
        })
        .collect()
}

/// The fixed label-mapping rule: exactly one diagnosis code is the positive
/// class, everything else is negative.
pub fn label_for(dx: &str, positive_label: &str) -> f32 {
    if dx == positive_label {
        1.
    } else {
        0.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "lesion_id,image_id,dx,dx_type,age,sex,localization\n\
                            HAM_0,ISIC_001,bkl,histo,80,male,scalp\n\
                            HAM_1,ISIC_002,mel,histo,60,female,back\n";

    #[test]
    fn drops_header_and_trailing_line() {
        let records = parse_manifest(MANIFEST);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].image_id, "ISIC_001");
        assert_eq!(records[0].dx, "bkl");
        assert_eq!(records[1].image_id, "ISIC_002");
        assert_eq!(records[1].localization, "back");
    }

    #[test]
    fn drops_records_without_image_id() {
        let text = "header\nHAM_0,,bkl,histo,80,male,scalp\nHAM_1,ISIC_002,mel,histo,60,female,back\n";
        let records = parse_manifest(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].image_id, "ISIC_002");
    }

    #[test]
    fn short_lines_parse_with_empty_fields() {
        let text = "header\nHAM_0,ISIC_001,bkl\n";
        let records = parse_manifest(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].dx, "bkl");
        assert_eq!(records[0].sex, "");
    }

    #[test]
    fn header_only_manifest_is_empty() {
        assert!(parse_manifest("header\n").is_empty());
        assert!(parse_manifest("").is_empty());
    }

    #[test]
    fn label_mapping_is_deterministic() {
        assert_eq!(label_for("bkl", "bkl"), 1.);
        assert_eq!(label_for("mel", "bkl"), 0.);
        assert_eq!(label_for("nv", "bkl"), 0.);
        assert_eq!(label_for("", "bkl"), 0.);
    }
}
