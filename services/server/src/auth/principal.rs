//! 主体目录：登录时按 subject 查询预期凭证与属性。

use std::collections::{BTreeMap, HashMap};

use anyhow::{anyhow, bail};
use sha2::{Digest, Sha256};

/// 单个主体记录。
#[derive(Clone)]
pub(crate) struct PrincipalRecord {
    pub(crate) subject: String,
    pub(crate) proof: String,
    /// 签发 token 时写入声明的属性。
    pub(crate) attributes: BTreeMap<String, String>,
}

impl std::fmt::Debug for PrincipalRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrincipalRecord")
            .field("subject", &self.subject)
            .field("proof", &"<redacted>")
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// 主体不存在时参与比较的占位凭证。
const ABSENT_PROOF: &str = "pd:absent-principal";

impl PrincipalRecord {
    /// 比较提交的凭证；比较摘要而非明文。
    pub(crate) fn proof_matches(&self, provided: &str) -> bool {
        digest_eq(&self.proof, provided)
    }
}

/// 主体不存在时执行与 `proof_matches` 相同代价的比较，结果不可用于放行。
pub(crate) fn proof_matches_absent(provided: &str) -> bool {
    std::hint::black_box(digest_eq(ABSENT_PROOF, provided))
}

fn digest_eq(expected: &str, provided: &str) -> bool {
    Sha256::digest(expected.as_bytes()) == Sha256::digest(provided.as_bytes())
}

/// 主体查询能力；存储实现可替换而不影响鉴权逻辑。
pub(crate) trait PrincipalDirectory: Send + Sync {
    fn lookup(&self, subject: &str) -> Option<PrincipalRecord>;
}

/// 启动时由配置构造的静态目录。
#[derive(Debug, Clone, Default)]
pub(crate) struct StaticDirectory {
    records: HashMap<String, PrincipalRecord>,
}

impl StaticDirectory {
    pub(crate) fn new(records: impl IntoIterator<Item = PrincipalRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.subject.clone(), record))
                .collect(),
        }
    }

    /// 已登记主体（排序后），供诊断输出。
    pub(crate) fn subjects(&self) -> Vec<String> {
        let mut subjects = self.records.keys().cloned().collect::<Vec<_>>();
        subjects.sort();
        subjects
    }
}

impl PrincipalDirectory for StaticDirectory {
    fn lookup(&self, subject: &str) -> Option<PrincipalRecord> {
        self.records.get(subject).cloned()
    }
}

/// 解析 `subject:proof[:k=v;k=v]` 逗号分隔列表。
pub(crate) fn parse_principals(raw: &str) -> anyhow::Result<Vec<PrincipalRecord>> {
    let mut records = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|v| !v.is_empty()) {
        let mut fields = entry.splitn(3, ':');
        let subject = fields.next().unwrap_or_default().trim();
        let proof = fields.next().unwrap_or_default();
        if subject.is_empty() || proof.is_empty() {
            bail!("invalid principal entry (expected subject:proof): {subject:?}");
        }

        let mut attributes = BTreeMap::new();
        if let Some(attrs) = fields.next() {
            for pair in attrs.split(';').map(str::trim).filter(|v| !v.is_empty()) {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| anyhow!("invalid attribute for {subject}: {pair}"))?;
                let key = key.trim();
                if key.is_empty() {
                    bail!("empty attribute key for {subject}");
                }
                attributes.insert(key.to_string(), value.trim().to_string());
            }
        }

        if records
            .iter()
            .any(|record: &PrincipalRecord| record.subject == subject)
        {
            bail!("duplicate principal: {subject}");
        }
        records.push(PrincipalRecord {
            subject: subject.to_string(),
            proof: proof.to_string(),
            attributes,
        });
    }
    if records.is_empty() {
        bail!("principal list is empty");
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::{PrincipalDirectory, StaticDirectory, parse_principals, proof_matches_absent};

    #[test]
    fn parses_subjects_proofs_and_attributes() {
        let records = parse_principals("admin:pw1:role=admin;team=ops, bob:pw2").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].subject, "admin");
        assert_eq!(records[0].attributes.get("role").unwrap(), "admin");
        assert_eq!(records[0].attributes.get("team").unwrap(), "ops");
        assert!(records[1].attributes.is_empty());
    }

    #[test]
    fn rejects_incomplete_or_duplicate_entries() {
        assert!(parse_principals("").is_err());
        assert!(parse_principals("admin").is_err());
        assert!(parse_principals("admin:").is_err());
        assert!(parse_principals("admin:pw:role").is_err());
        assert!(parse_principals("a:1,a:2").is_err());
    }

    #[test]
    fn lookup_and_proof_check() {
        let directory = StaticDirectory::new(parse_principals("admin:s3cret").unwrap());
        let record = directory.lookup("admin").unwrap();
        assert!(record.proof_matches("s3cret"));
        assert!(!record.proof_matches("S3cret"));
        assert!(directory.lookup("nobody").is_none());
        assert!(!format!("{record:?}").contains("s3cret"));
        assert_eq!(directory.subjects(), vec!["admin".to_string()]);
    }

    #[test]
    fn absent_principal_comparison_never_matches_real_proofs() {
        for proof in ["admin", "s3cret", "", "pd:absent"] {
            assert!(!proof_matches_absent(proof), "{proof}");
        }
    }
}
