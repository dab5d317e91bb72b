//! JSON 내보내기.
//!
//! 파일 출력은 같은 디렉토리의 임시 파일에 쓴 뒤 이름을 바꾸므로,
//! 실패해도 불완전한 JSON 파일이 남지 않습니다.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use equity_core::ExportDocument;

/// 문서를 파일 또는 표준 출력으로 내보냅니다.
pub fn write_export(document: &ExportDocument, output: Option<&Path>) -> Result<()> {
    let json = document
        .to_json_pretty()
        .context("내보내기 문서 직렬화 실패")?;

    match output {
        Some(path) => write_atomic(path, json.as_bytes()),
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(json.as_bytes())?;
            handle.write_all(b"\n")?;
            handle.flush()?;
            Ok(())
        }
    }
}

/// 임시 파일에 쓴 뒤 대상 경로로 이름을 바꿉니다.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("출력 디렉토리 생성 실패: {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("임시 파일 생성 실패: {}", dir.display()))?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("출력 파일 저장 실패: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use equity_core::CompanyInfo;

    #[test]
    fn test_write_atomic_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/AAPL.json");

        write_atomic(&path, b"{}").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_write_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AAPL.json");
        let doc = ExportDocument::new(CompanyInfo::new("AAPL"), vec![], vec![], Utc::now());

        write_export(&doc, Some(&path)).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["ticker"], "AAPL");
        // 임시 파일이 남지 않는다
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
