//! Output implementations: folder layout, organizer and zip packager

pub mod layout;
pub mod organizer;
pub mod packager;

pub use layout::*;
pub use organizer::*;
pub use packager::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{ArchivePackager, ArtifactOrganizer, ArtifactType, GeneratedArtifact};
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_organized_folder_round_trips_through_archive() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let organizer = FileSystemOrganizer::new(temp_dir.path().join("out")).unwrap();
        let packager = ZipPackager::new();

        let artifacts = vec![
            GeneratedArtifact::new(ArtifactType::Entity, "Lead.cs", "public class Lead {}").unwrap(),
            GeneratedArtifact::new(ArtifactType::UiTypes, "Lead.types.ts", "export interface Lead {}")
                .unwrap(),
        ];
        let organized = organizer.organize(&artifacts, "Leads").await.unwrap();
        let archive = packager
            .create_archive(&organized.root, &temp_dir.path().join("archives"))
            .await
            .unwrap();

        let extracted = temp_dir.path().join("extracted");
        packager.extract(&archive, &extracted).await.unwrap();

        let relative = |root: &std::path::Path| -> BTreeSet<String> {
            walkdir::WalkDir::new(root)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
                .map(|e| {
                    e.path()
                        .strip_prefix(root)
                        .unwrap()
                        .to_string_lossy()
                        .replace('\\', "/")
                })
                .collect()
        };
        let original = relative(&organized.root);
        assert_eq!(original, relative(&extracted));
        assert!(original.contains("Frontend/src/types/Lead.types.ts"));

        for file in &original {
            assert_eq!(
                std::fs::read(organized.root.join(file)).unwrap(),
                std::fs::read(extracted.join(file)).unwrap()
            );
        }
    }
}
