use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use git2::{BranchType, ObjectType, Oid, Repository as Git2Repository, Sort};
use graph::{Commit, HEAD};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::retriever::LogRetriever;

/// Upper bound on unreachable commits reported per refresh
pub const UNREACHABLE_LIMIT: usize = 50;

pub struct Repository {
    path: PathBuf,
    git_repo: Git2Repository,
}

impl Repository {
    /// Open an existing repository (work tree or bare)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let git_repo = Git2Repository::open(&path)
            .with_context(|| format!("Failed to open repository at {}", path.display()))?;

        Ok(Repository { path, git_repo })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reference names grouped by the commit they resolve to, in decoration
    /// order: HEAD, local branches, remote branches, tags.
    pub fn refs_by_commit(&self) -> Result<HashMap<Oid, Vec<String>>> {
        let mut map: HashMap<Oid, Vec<String>> = HashMap::new();

        if let Ok(head) = self.git_repo.head() {
            if let Some(target) = head.target() {
                map.entry(target).or_default().push(HEAD.to_string());
            }
        }

        for kind in [BranchType::Local, BranchType::Remote] {
            for branch in self.git_repo.branches(Some(kind))? {
                let (branch, _) = branch?;
                // Symbolic refs such as origin/HEAD have no direct target.
                if let (Some(name), Some(target)) = (branch.name()?, branch.get().target()) {
                    map.entry(target).or_default().push(name.to_string());
                }
            }
        }

        let mut tags = Vec::new();
        self.git_repo.tag_foreach(|oid, name| {
            if let Some(tag_name) = std::str::from_utf8(name)
                .ok()
                .and_then(|name| name.strip_prefix("refs/tags/"))
            {
                tags.push((oid, tag_name.to_string()));
            }
            true
        })?;
        for (oid, name) in tags {
            // Annotated tags point at tag objects; show them on their commit.
            match self.git_repo.find_object(oid, None).and_then(|obj| obj.peel_to_commit()) {
                Ok(commit) => map.entry(commit.id()).or_default().push(name),
                Err(err) => debug!(tag = %name, error = %err, "skipping tag without commit"),
            }
        }

        Ok(map)
    }

    /// Every commit reachable from HEAD or any reference
    fn reachable_commits(&self) -> Result<HashSet<Oid>> {
        let mut revwalk = self.git_repo.revwalk()?;
        self.push_tips(&mut revwalk)?;
        revwalk
            .map(|oid| oid.map_err(Into::into))
            .collect()
    }

    fn push_tips(&self, revwalk: &mut git2::Revwalk<'_>) -> Result<()> {
        // An unborn HEAD has nothing to push.
        if self.git_repo.head().is_ok() {
            revwalk.push_head()?;
        }
        // Every ref counts, stash and notes included, like `git log --all`.
        for reference in self.git_repo.references()? {
            let reference = reference?;
            // Tags on trees or blobs and dangling symbolic refs name no commit.
            if let Ok(commit) = reference.peel_to_commit() {
                revwalk.push(commit.id())?;
            }
        }
        Ok(())
    }

    fn to_record(&self, commit: &git2::Commit<'_>, refs: &HashMap<Oid, Vec<String>>) -> Result<Commit> {
        let timestamp = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .context("Invalid commit timestamp")?;

        let mut record = Commit::new(commit.id().to_string())
            .with_parents(commit.parent_ids().map(|oid| oid.to_string()))
            .with_subject(commit.summary().unwrap_or(""))
            .with_author(commit.author().name().unwrap_or("Unknown"))
            .with_timestamp(timestamp);
        record.refs = refs.get(&commit.id()).cloned().unwrap_or_default();
        Ok(record)
    }
}

impl LogRetriever for Repository {
    fn recent_commits(&self, count: usize) -> Result<Vec<Commit>> {
        let refs = self.refs_by_commit()?;
        let mut revwalk = self.git_repo.revwalk()?;
        // Ensure stable topology ordering for graph rendering
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        self.push_tips(&mut revwalk)?;

        let mut commits = Vec::with_capacity(count);
        for oid in revwalk.take(count) {
            let commit = self.git_repo.find_commit(oid?)?;
            commits.push(self.to_record(&commit, &refs)?);
        }

        debug!(count = commits.len(), path = %self.path.display(), "retrieved commits");
        Ok(commits)
    }

    fn active_reference_name(&self) -> Result<String> {
        let head = match self.git_repo.head() {
            Ok(head) => head,
            Err(err) if err.code() == git2::ErrorCode::UnbornBranch => return Ok(String::new()),
            Err(err) => return Err(err).context("Failed to resolve HEAD"),
        };
        if !head.is_branch() {
            return Ok(String::new());
        }
        Ok(head.shorthand().unwrap_or("").to_string())
    }

    fn recent_unreachable_commit_hashes(&self) -> Result<Vec<String>> {
        let reachable = self.reachable_commits()?;
        let odb = self.git_repo.odb()?;

        let mut candidates = Vec::new();
        odb.foreach(|oid| {
            candidates.push(*oid);
            true
        })?;

        let mut unreachable = Vec::new();
        for oid in candidates {
            if reachable.contains(&oid) {
                continue;
            }
            let (_, kind) = odb.read_header(oid)?;
            if kind != ObjectType::Commit {
                continue;
            }
            let commit = self.git_repo.find_commit(oid)?;
            unreachable.push((commit.time().seconds(), oid));
        }

        // Packed and loose objects can both list the same id.
        unreachable.sort_unstable_by(|a, b| b.cmp(a));
        unreachable.dedup();
        Ok(unreachable
            .into_iter()
            .take(UNREACHABLE_LIMIT)
            .map(|(_, oid)| oid.to_string())
            .collect())
    }

    fn specific_commits(&self, hashes: &[String]) -> Result<Vec<Commit>> {
        let refs = self.refs_by_commit()?;
        let mut commits = Vec::with_capacity(hashes.len());
        for hash in hashes {
            let found = Oid::from_str(hash).and_then(|oid| self.git_repo.find_commit(oid));
            match found {
                Ok(commit) => commits.push(self.to_record(&commit, &refs)?),
                Err(err) => debug!(%hash, error = %err, "skipping unknown commit"),
            }
        }
        Ok(commits)
    }
}
