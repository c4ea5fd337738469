/// 値表現のテスト
///
/// 各方言のリテラル生成と、エンジンから読み出したテキストの復元を確認します。

#[cfg(test)]
mod value_representer_tests {
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use dataferry::adapters::value_representer::create_representer;
    use dataferry::core::config::Dialect;
    use dataferry::core::schema::{DataTypeDescriptor, DataTypeTag};
    use dataferry::core::value::SqlValue;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use uuid::Uuid;

    const DIALECTS: [Dialect; 3] = [Dialect::PostgreSQL, Dialect::MySQL, Dialect::SQLite];

    fn scalar(tag: DataTypeTag) -> DataTypeDescriptor {
        DataTypeDescriptor::scalar(tag).unwrap()
    }

    /// 真偽値のリテラルが方言ごとに異なることを確認
    #[test]
    fn test_boolean_literals() {
        let expected = [
            (Dialect::PostgreSQL, "TRUE"),
            (Dialect::MySQL, "TRUE"),
            (Dialect::SQLite, "1"),
        ];
        for (dialect, literal) in expected {
            assert_eq!(create_representer(dialect).literal(&SqlValue::Bool(true)), literal);
        }
    }

    /// 単一引用符を含む文字列が全方言で正しくエスケープされることを確認
    #[test]
    fn test_quote_escaping() {
        let value = SqlValue::Text("O'Brien".to_string());
        assert_eq!(create_representer(Dialect::PostgreSQL).literal(&value), "'O''Brien'");
        assert_eq!(create_representer(Dialect::MySQL).literal(&value), "'O\\'Brien'");
        assert_eq!(create_representer(Dialect::SQLite).literal(&value), "'O''Brien'");
    }

    /// バイナリのリテラル形式を確認
    #[test]
    fn test_binary_literals() {
        let value = SqlValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(
            create_representer(Dialect::PostgreSQL).literal(&value),
            "'\\xdeadbeef'"
        );
        assert_eq!(create_representer(Dialect::MySQL).literal(&value), "X'deadbeef'");
        assert_eq!(create_representer(Dialect::SQLite).literal(&value), "X'deadbeef'");
    }

    /// 数値と日時のリテラルが方言に依存しない書式になることを確認
    #[test]
    fn test_invariant_numeric_and_temporal_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let datetime = date.and_hms_micro_opt(13, 4, 5, 120_000).unwrap();

        for dialect in DIALECTS {
            let representer = create_representer(dialect);
            assert_eq!(representer.literal(&SqlValue::Int(-42)), "-42");
            assert_eq!(representer.literal(&SqlValue::Float(1.5)), "1.5");
            assert_eq!(
                representer.literal(&SqlValue::Decimal(Decimal::from_str("10.500").unwrap())),
                "10.5"
            );
            assert_eq!(representer.literal(&SqlValue::Date(date)), "'2024-03-05'");
            assert_eq!(
                representer.literal(&SqlValue::DateTime(datetime)),
                "'2024-03-05 13:04:05.12'"
            );
            assert_eq!(representer.literal(&SqlValue::Null), "NULL");
        }
    }

    /// オフセット付き日時の扱いを確認（MySQLはUTCに変換）
    #[test]
    fn test_datetime_offset_literals() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let value = SqlValue::DateTimeOffset(offset.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap());

        assert_eq!(
            create_representer(Dialect::PostgreSQL).literal(&value),
            "'2024-06-01 12:30:00+02:00'"
        );
        assert_eq!(
            create_representer(Dialect::MySQL).literal(&value),
            "'2024-06-01 10:30:00'"
        );
    }

    /// 型付き表現でカラム型に合わせて値が変換されることを確認
    #[test]
    fn test_represent_typed_coerces_to_column_type() {
        let sqlite = create_representer(Dialect::SQLite);
        assert_eq!(
            sqlite.represent_typed(&SqlValue::Text("true".to_string()), &DataTypeDescriptor::boolean()),
            "1"
        );

        let postgres = create_representer(Dialect::PostgreSQL);
        assert_eq!(
            postgres.represent_typed(&SqlValue::Int(7), &DataTypeDescriptor::varchar(10)),
            "'7'"
        );
    }

    /// PostgreSQLの型に依存しない表現ではキャスト注釈が付くことを確認
    #[test]
    fn test_postgres_represent_adds_casts() {
        let postgres = create_representer(Dialect::PostgreSQL);
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(postgres.represent(&SqlValue::Date(date)), "'2024-01-01'::date");
        assert_eq!(postgres.represent(&SqlValue::Int(1)), "1");
    }

    /// 読み出したテキストが型付き値に戻ることを確認
    #[test]
    fn test_parse_text_for_each_type() {
        let guid = Uuid::parse_str("0b3c1d52-8f3e-4d8c-a5f1-6b4c2e9d7a10").unwrap();
        let cases = [
            ("t", DataTypeDescriptor::boolean(), SqlValue::Bool(true)),
            ("  12 ", DataTypeDescriptor::integer(), SqlValue::Int(12)),
            (
                "3.25",
                DataTypeDescriptor::decimal(6, 2),
                SqlValue::Decimal(Decimal::from_str("3.25").unwrap()),
            ),
            ("\\x0aff", scalar(DataTypeTag::Blob), SqlValue::Bytes(vec![0x0a, 0xff])),
            (
                "0b3c1d52-8f3e-4d8c-a5f1-6b4c2e9d7a10",
                scalar(DataTypeTag::Guid),
                SqlValue::Guid(guid),
            ),
            (
                "2024-03-05",
                scalar(DataTypeTag::Date),
                SqlValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()),
            ),
            (" padded ", DataTypeDescriptor::text(), SqlValue::Text(" padded ".to_string())),
        ];

        for dialect in DIALECTS {
            let representer = create_representer(dialect);
            for (text, data_type, expected) in &cases {
                assert_eq!(
                    &representer.parse_text(text, data_type).unwrap(),
                    expected,
                    "{} {:?}",
                    dialect,
                    text
                );
            }
        }
    }

    /// 変換できないテキストはエラーになることを確認
    #[test]
    fn test_parse_text_rejects_invalid_literal() {
        let representer = create_representer(Dialect::SQLite);
        let error = representer
            .parse_text("not a number", &DataTypeDescriptor::integer())
            .unwrap_err();
        assert!(error.is_invalid_literal());
    }

    /// PostgreSQLの無限大の日時はエラーになることを確認
    #[test]
    fn test_postgres_infinite_timestamp_is_rejected() {
        let representer = create_representer(Dialect::PostgreSQL);
        let error = representer
            .parse_text("-infinity", &scalar(DataTypeTag::DateTime))
            .unwrap_err();
        assert!(error.is_invalid_literal());
    }
}
