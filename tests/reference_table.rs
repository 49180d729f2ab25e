// Integration tests for the bundled reference table and its cache

#[cfg(test)]
mod tests {
    use odds_converter::config::Config;
    use odds_converter::engine::MAX_DENOMINATOR;
    use odds_converter::table::{Field, ReferenceTable, TableCache, TableError, Tolerances};
    use std::io::Write;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    const HEADER: &str = "american_moneyline,fraction,decimal,implied_probability";

    fn write_table(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "{HEADER}").unwrap();
        write!(file, "{body}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_bundled_table_is_consistent() {
        let table = ReferenceTable::load(Path::new("data/odds.csv")).unwrap();
        assert_eq!(table.len(), 201);

        let discrepancies = table
            .cross_check(&Tolerances::default(), MAX_DENOMINATOR)
            .unwrap();
        assert!(
            discrepancies.is_empty(),
            "unexpected discrepancies: {discrepancies:?}"
        );
    }

    #[test]
    fn test_bundled_table_matches_config_path() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        let table = ReferenceTable::load(&config.table.path).unwrap();
        let discrepancies = table
            .cross_check(&config.table.tolerances(), config.conversion.max_denominator)
            .unwrap();
        assert!(discrepancies.is_empty());
    }

    #[test]
    fn test_bundled_table_lookup() {
        let table = ReferenceTable::load(Path::new("data/odds.csv")).unwrap();

        let row = table.lookup(-110).unwrap();
        assert_eq!(row.fraction.to_string(), "10/11");
        assert!((row.decimal - 1.9091).abs() < 1e-9);
        assert!((row.implied_probability - 0.5238).abs() < 1e-9);

        let row = table.lookup(150).unwrap();
        assert_eq!(row.fraction.to_string(), "3/2");

        // -100 is expressed as +100 in the table
        assert!(table.lookup(-100).is_none());
        assert!(table.lookup(100).is_some());

        // 0.40 is +150 exactly
        let nearest = table.nearest_by_probability(0.40).unwrap();
        assert_eq!(nearest.american_moneyline, 150);
    }

    #[test]
    fn test_wrong_fraction_is_reported() {
        let file = write_table("-110,11/10,1.9091,0.5238\n150,3/2,2.5,0.4\n");
        let table = ReferenceTable::load(file.path()).unwrap();

        let discrepancies = table
            .cross_check(&Tolerances::default(), MAX_DENOMINATOR)
            .unwrap();
        assert_eq!(discrepancies.len(), 1);
        assert_eq!(discrepancies[0].field, Field::Fraction);
        assert_eq!(discrepancies[0].line, 2);
        assert_eq!(
            discrepancies[0].to_string(),
            "line 2 (-110): fraction expected 10/11, found 11/10"
        );
    }

    #[test]
    fn test_unreadable_value_names_the_line() {
        let file = write_table("-110,10/11,1.9091,0.5238\n150,3/2,two fifty,0.4\n");
        match ReferenceTable::load(file.path()) {
            Err(TableError::InvalidValue { line, column, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "decimal");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_spreadsheet_export_with_notes_column() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "\u{feff}\"Implied_Probability\",\"Notes\",\"American_Moneyline\",\"Fraction\",\"Decimal\"\r\n\
             0.5238,\"home, favourite\",-110.0,10/11,1.9091\r\n\
             0.4000,\"away, \"\"long\"\" shot\",+150,3/2,2.5000\r\n"
        )
        .unwrap();
        file.flush().unwrap();

        let table = ReferenceTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(-110).unwrap().line, 2);
        assert_eq!(table.lookup(150).unwrap().line, 3);
        assert!(table
            .cross_check(&Tolerances::default(), MAX_DENOMINATOR)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_zero_moneyline_row_is_rejected() {
        let file = write_table("0,1/1,2.0,0.5\n");
        assert!(matches!(
            ReferenceTable::load(file.path()),
            Err(TableError::InvalidOdds { line: 2, .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let err = ReferenceTable::load(&path).unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
        assert!(err.to_string().contains("absent.csv"));
    }

    #[test]
    fn test_cache_serves_from_memory_until_invalidated() {
        let file = write_table("150,3/2,2.5,0.4\n");
        let mut cache = TableCache::new(Some(Duration::from_secs(3600)));

        let first = cache.get_or_load(file.path()).unwrap();
        assert_eq!(first.len(), 1);

        // Rewrite the file; the cached copy is still served
        std::fs::write(
            file.path(),
            format!("{HEADER}\n150,3/2,2.5,0.4\n-110,10/11,1.9091,0.5238\n"),
        )
        .unwrap();
        let cached = cache.get_or_load(file.path()).unwrap();
        assert_eq!(cached.len(), 1);

        cache.invalidate();
        let reloaded = cache.get_or_load(file.path()).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(cache.loaded_at().is_some());
    }
}
