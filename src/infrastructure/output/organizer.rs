//! Filesystem organizer - lays rendered artifacts out as a project folder

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::core::utils::is_confined_relative;
use crate::generation::{
    ArtifactCategory, ArtifactOrganizer, GeneratedArtifact, GenerationError, OrganizedArtifacts,
    OrganizedFile,
};
use crate::infrastructure::output::FolderLayout;

pub const README_FILE: &str = "README.md";
pub const IGNORE_FILE: &str = ".gitignore";

/// Used when sanitizing leaves nothing of the project name
const FALLBACK_FOLDER_NAME: &str = "project";

const GITIGNORE: &str = "\
# .NET build output
bin/
obj/
*.user
*.suo
.vs/

# Frontend
node_modules/
dist/
build/
coverage/
*.tsbuildinfo

# Environment and secrets
.env
.env.local
appsettings.*.local.json

# Editors and OS
.idea/
.vscode/
*.swp
.DS_Store
Thumbs.db
";

/// Replaces characters that are not allowed in a path component.
///
/// Separators, reserved punctuation and control characters become `_`;
/// leading and trailing dots and spaces are trimmed.
///
/// # Examples
/// ```
/// use formgen::infrastructure::output::sanitize_folder_name;
///
/// assert_eq!(sanitize_folder_name("Customer Intake"), "Customer Intake");
/// assert_eq!(sanitize_folder_name("a/b:c*d"), "a_b_c_d");
/// assert_eq!(sanitize_folder_name(".."), "project");
/// ```
pub fn sanitize_folder_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.is_empty() {
        FALLBACK_FOLDER_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Writes artifacts under `<output root>/<sanitized project name>/` using a
/// [`FolderLayout`]
///
/// Directories registered with [`FileSystemOrganizer::with_protected_dir`]
/// (the archive destination, typically) may neither contain nor sit inside a
/// project root, since the root is cleared on every run.
#[derive(Debug, Clone)]
pub struct FileSystemOrganizer {
    output_root: PathBuf,
    layout: FolderLayout,
    protected: Vec<PathBuf>,
}

impl FileSystemOrganizer {
    /// Organizer using the default layout
    pub fn new(output_root: impl Into<PathBuf>) -> Result<Self, GenerationError> {
        let layout = FolderLayout::default();
        layout.validate()?;
        Ok(Self {
            output_root: output_root.into(),
            layout,
            protected: Vec::new(),
        })
    }

    /// Organizer using a custom, possibly partial layout. Artifacts whose
    /// type has no folder are skipped.
    pub fn with_layout(
        output_root: impl Into<PathBuf>,
        layout: FolderLayout,
    ) -> Result<Self, GenerationError> {
        layout.validate_paths()?;
        let unmapped = layout.unmapped();
        if !unmapped.is_empty() {
            warn!(?unmapped, "Folder layout does not map every artifact type");
        }
        Ok(Self {
            output_root: output_root.into(),
            layout,
            protected: Vec::new(),
        })
    }

    /// Refuse to organize into any project root overlapping `dir`
    pub fn with_protected_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.protected.push(dir.into());
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn layout(&self) -> &FolderLayout {
        &self.layout
    }

    /// Project root plus the resolved target of every mapped artifact
    fn plan<'a>(
        &self,
        artifacts: &'a [GeneratedArtifact],
        project_name: &str,
    ) -> Result<(PathBuf, Vec<(&'a GeneratedArtifact, PathBuf)>), GenerationError> {
        let root = self.output_root.join(sanitize_folder_name(project_name));
        if let Some(dir) = self.protected.iter().find(|dir| paths_overlap(&root, dir)) {
            return Err(GenerationError::Organize(format!(
                "Output folder {} overlaps the protected directory {}",
                root.display(),
                dir.display()
            )));
        }

        let mut targets = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let file = Path::new(artifact.file_path());
            if !is_confined_relative(file) {
                return Err(GenerationError::Organize(format!(
                    "File path of {} artifact must stay inside the project folder: {}",
                    artifact.artifact_type(),
                    artifact.file_path()
                )));
            }
            match self.layout.folder_for(artifact.artifact_type()) {
                Some(folder) => targets.push((artifact, root.join(folder).join(file))),
                None => warn!(
                    artifact_type = %artifact.artifact_type(),
                    file = %artifact.file_path(),
                    "No folder mapped for artifact type, skipping"
                ),
            }
        }
        Ok((root, targets))
    }
}

/// Lexical containment in either direction, after making both paths absolute
fn paths_overlap(a: &Path, b: &Path) -> bool {
    let absolute = |p: &Path| std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf());
    let (a, b) = (absolute(a), absolute(b));
    a.starts_with(&b) || b.starts_with(&a)
}

#[async_trait]
impl ArtifactOrganizer for FileSystemOrganizer {
    async fn organize(
        &self,
        artifacts: &[GeneratedArtifact],
        project_name: &str,
    ) -> Result<OrganizedArtifacts, GenerationError> {
        let (root, targets) = self.plan(artifacts, project_name)?;

        // A previous run for the same project is replaced, never merged.
        if fs::try_exists(&root).await? {
            debug!(root = %root.display(), "Removing previous output folder");
            fs::remove_dir_all(&root).await.map_err(|e| {
                GenerationError::Organize(format!("Failed to clear {}: {e}", root.display()))
            })?;
        }

        let mut directories = BTreeSet::new();
        directories.insert(root.clone());
        directories.extend(
            targets
                .iter()
                .filter_map(|(_, path)| path.parent().map(Path::to_path_buf)),
        );
        for directory in &directories {
            fs::create_dir_all(directory).await.map_err(|e| {
                GenerationError::Organize(format!(
                    "Failed to create directory {}: {e}",
                    directory.display()
                ))
            })?;
        }

        let mut files = Vec::with_capacity(targets.len());
        for (artifact, path) in targets {
            fs::write(&path, artifact.content()).await.map_err(|e| {
                GenerationError::Organize(format!("Failed to write {}: {e}", path.display()))
            })?;
            files.push(OrganizedFile {
                artifact_type: artifact.artifact_type(),
                file_name: artifact.file_path().to_string(),
                size_bytes: artifact.size_bytes(),
                full_path: path,
            });
        }

        let organized = OrganizedArtifacts { root, files };
        let readme = render_readme(project_name, &organized);
        fs::write(organized.root.join(README_FILE), readme).await?;
        fs::write(organized.root.join(IGNORE_FILE), GITIGNORE).await?;

        info!(
            root = %organized.root.display(),
            files = organized.file_count(),
            bytes = organized.total_size_bytes(),
            "Artifacts organized"
        );
        Ok(organized)
    }
}

/// Human-readable byte size
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn render_readme(project_name: &str, organized: &OrganizedArtifacts) -> String {
    let mut out = String::new();
    let root_name = organized
        .root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_FOLDER_NAME.to_string());

    let _ = writeln!(out, "# {project_name}\n");
    let _ = writeln!(
        out,
        "Generated by formgen on {} UTC.\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "- Files: {}", organized.file_count());
    let _ = writeln!(
        out,
        "- Total size: {}\n",
        format_size(organized.total_size_bytes())
    );

    let mut paths: Vec<String> = organized
        .files
        .iter()
        .map(|f| relative_path(&organized.root, &f.full_path))
        .collect();
    paths.push(README_FILE.to_string());
    paths.push(IGNORE_FILE.to_string());

    let _ = writeln!(out, "## Structure\n");
    let _ = writeln!(out, "```text\n{}```\n", render_tree(&root_name, &paths));

    let mut by_category: BTreeMap<ArtifactCategory, Vec<&OrganizedFile>> = BTreeMap::new();
    for file in &organized.files {
        by_category
            .entry(file.artifact_type.category())
            .or_default()
            .push(file);
    }
    for (category, files) in by_category {
        let _ = writeln!(out, "## {}\n", category.display_name());
        for file in files {
            let _ = writeln!(
                out,
                "- `{}` ({})",
                relative_path(&organized.root, &file.full_path),
                format_size(file.size_bytes)
            );
        }
        out.push('\n');
    }
    out
}

#[derive(Default)]
struct TreeNode {
    children: BTreeMap<String, TreeNode>,
}

/// Draws `/`-separated relative paths as a tree under `root_name`
fn render_tree(root_name: &str, paths: &[String]) -> String {
    let mut root = TreeNode::default();
    for path in paths {
        let mut node = &mut root;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            node = node.children.entry(part.to_string()).or_default();
        }
    }

    let mut out = format!("{root_name}/\n");
    draw_children(&root, "", &mut out);
    out
}

fn draw_children(node: &TreeNode, prefix: &str, out: &mut String) {
    let count = node.children.len();
    for (index, (name, child)) in node.children.iter().enumerate() {
        let last = index + 1 == count;
        let branch = if last { "└── " } else { "├── " };
        let suffix = if child.children.is_empty() { "" } else { "/" };
        let _ = writeln!(out, "{prefix}{branch}{name}{suffix}");
        let next = format!("{prefix}{}", if last { "    " } else { "│   " });
        draw_children(child, &next, out);
    }
}
