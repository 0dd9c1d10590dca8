use std::path::PathBuf;
use std::sync::Arc;
use vcs_overlay::watch::NullOverlaySink;
use vcs_overlay::{
    ActionDispatcher, CommitAnswer, MemorySettingsStore, Project, RememberValue, Settings,
    VCItemStatus,
};

mod common;
use common::{fixtures::*, prompter::QueuedPrompter, repository::*};

fn settings(should_delete: RememberValue, commit_after_move: RememberValue) -> Settings {
    Settings {
        should_delete,
        commit_after_move,
        watch_project: false,
        ..Settings::default()
    }
}

fn attach(repo: &TestRepo, settings: Settings, prompter: Arc<QueuedPrompter>) -> ActionDispatcher {
    let mut dispatcher = ActionDispatcher::new(
        Arc::new(MemorySettingsStore::new(settings)),
        prompter,
        Arc::new(NullOverlaySink),
    );
    dispatcher.attach(Project::new(repo.path())).unwrap();
    dispatcher.settle();
    dispatcher
}

#[cfg(test)]
mod overlay_tests {
    use super::*;

    #[test]
    fn test_overlays_follow_git_status() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(&repo, Settings::default(), prompter);

        assert_eq!(
            dispatcher.overlay_of(&repo.file("initial.txt")),
            Some(VCItemStatus::Modified)
        );
        assert_eq!(
            dispatcher.overlay_of(&repo.file("notes.txt")),
            Some(VCItemStatus::Unknown)
        );
        assert_eq!(
            dispatcher.overlay_of(&repo.file("clean.txt")),
            Some(VCItemStatus::UpToDate)
        );
        assert_eq!(
            dispatcher.overlay_of(&repo.file("src")),
            Some(VCItemStatus::UpToDate)
        );
        assert_eq!(
            dispatcher.overlay_of(repo.path()),
            Some(VCItemStatus::Modified)
        );
        Ok(())
    }

    #[test]
    fn test_detached_dispatcher_has_no_overlays() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(&repo, Settings::default(), prompter);

        assert!(!dispatcher.project_changed(None, &[]));

        assert!(!dispatcher.is_attached());
        assert_eq!(dispatcher.overlay_of(&repo.file("initial.txt")), None);
        Ok(())
    }
}

#[cfg(test)]
mod delete_tests {
    use super::*;

    #[test]
    fn test_remembered_yes_removes_through_git() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(
            &repo,
            settings(RememberValue::Yes, RememberValue::Ask),
            prompter,
        );

        assert!(dispatcher.file_delete(&[repo.file("clean.txt")], true));

        assert!(!repo.file("clean.txt").exists());
        assert!(!tracked_files(repo.path())?.contains(&"clean.txt".to_string()));
        Ok(())
    }

    #[test]
    fn test_declined_and_remembered_keeps_files() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::remembering(false, true));
        let mut dispatcher = attach(&repo, Settings::default(), prompter);

        assert!(dispatcher.file_delete(&[repo.file("clean.txt")], true));

        assert!(repo.file("clean.txt").exists());
        assert_eq!(dispatcher.settings().should_delete, RememberValue::No);
        Ok(())
    }

    #[test]
    fn test_unversioned_batch_is_left_to_the_host() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(
            &repo,
            settings(RememberValue::Yes, RememberValue::Ask),
            prompter,
        );

        assert!(!dispatcher.file_delete(&[repo.file("notes.txt")], true));
        assert!(repo.file("notes.txt").exists());
        Ok(())
    }

    #[test]
    fn test_local_modifications_need_confirmation() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(
            &repo,
            settings(RememberValue::Yes, RememberValue::Ask),
            prompter.clone(),
        );

        // Exhausted queue declines the loss
        assert!(dispatcher.file_delete(&[repo.file("initial.txt")], true));
        assert!(repo.file("initial.txt").exists());

        prompter.confirms.lock().push_back(true);
        assert!(dispatcher.file_delete(&[repo.file("initial.txt")], true));
        assert!(!repo.file("initial.txt").exists());
        Ok(())
    }

    #[test]
    fn test_batch_across_directories_is_refused() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(
            &repo,
            settings(RememberValue::Yes, RememberValue::Ask),
            prompter.clone(),
        );

        let paths = vec![repo.file("clean.txt"), repo.file("src/lib.txt")];
        assert!(dispatcher.file_delete(&paths, true));

        assert!(paths.iter().all(|path| path.exists()));
        let alerts = prompter.alerts.lock();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].starts_with("Unsafe delete operation"));
        Ok(())
    }
}

#[cfg(test)]
mod move_tests {
    use super::*;

    #[test]
    fn test_move_goes_through_git_and_commits() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(
            &repo,
            settings(RememberValue::Ask, RememberValue::Yes),
            prompter,
        );
        let from = repo.file("clean.txt");
        let to = repo.file("src/clean.txt");

        assert!(dispatcher.file_move(&from, &to));
        assert!(!from.exists());
        assert!(to.exists());

        assert!(dispatcher.file_moved(&from, &to));
        assert_eq!(
            last_commit_subject(repo.path())?,
            "Moved clean.txt to src/clean.txt"
        );
        Ok(())
    }

    #[test]
    fn test_never_commit_is_remembered() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::default());
        prompter.commits.lock().push_back(CommitAnswer::Never);
        let mut dispatcher = attach(&repo, Settings::default(), prompter);
        let from = repo.file("clean.txt");
        let to = repo.file("src/clean.txt");

        assert!(dispatcher.file_move(&from, &to));
        assert!(!dispatcher.file_moved(&from, &to));

        assert_eq!(dispatcher.settings().commit_after_move, RememberValue::No);
        assert_eq!(last_commit_subject(repo.path())?, "Add sources");
        Ok(())
    }

    #[test]
    fn test_untracked_source_is_left_to_the_host() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(&repo, Settings::default(), prompter);

        assert!(!dispatcher.file_move(&repo.file("notes.txt"), &repo.file("src/notes.txt")));
        assert!(repo.file("notes.txt").exists());
        Ok(())
    }

    #[test]
    fn test_ignored_source_is_left_to_the_host() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        create_file(repo.path(), ".gitignore", "*.log\n")?;
        create_file(repo.path(), "debug.log", "trace\n")?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(&repo, Settings::default(), prompter.clone());
        let from = repo.file("debug.log");

        assert_eq!(dispatcher.overlay_of(&from), Some(VCItemStatus::Ignored));
        assert!(!dispatcher.file_move(&from, &repo.file("src/debug.log")));
        assert!(!dispatcher.file_rename(&from, &repo.file("trace.log")));

        // git mv rejects ignored paths; nothing reaches the backend to fail
        assert!(from.exists());
        assert!(prompter.alerts.lock().is_empty());
        Ok(())
    }

    #[test]
    fn test_backend_failure_is_reported_and_suppressed()-> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(&repo, Settings::default(), prompter.clone());

        // git mv refuses to overwrite an existing file
        assert!(dispatcher.file_rename(&repo.file("clean.txt"), &repo.file("src/lib.txt")));

        assert!(repo.file("clean.txt").exists());
        let alerts = prompter.alerts.lock();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].starts_with("Version control error"));
        Ok(())
    }
}

#[cfg(test)]
mod add_and_commit_tests {
    use super::*;

    #[test]
    fn test_new_file_is_offered_and_added() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        create_file(repo.path(), "added.txt", "fresh\n")?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(&repo, Settings::default(), prompter.clone());
        let path = repo.file("added.txt");

        assert!(!dispatcher.file_new(&path));
        assert!(!dispatcher.file_open(&path));
        assert_eq!(prompter.add_requests.lock().clone(), vec![path.clone()]);

        assert!(dispatcher.resolve_add_prompt(&path, true));
        dispatcher.settle();

        assert_eq!(dispatcher.overlay_of(&path), Some(VCItemStatus::Added));
        Ok(())
    }

    #[test]
    fn test_open_without_new_does_not_offer_add() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(&repo, Settings::default(), prompter.clone());

        assert!(!dispatcher.file_open(&repo.file("notes.txt")));
        assert!(prompter.add_requests.lock().is_empty());
        Ok(())
    }

    #[test]
    fn test_commit_clears_modification() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(&repo, Settings::default(), prompter);
        let path = repo.file("initial.txt");

        assert!(dispatcher.commit(std::slice::from_ref(&path), "Update initial"));
        dispatcher.settle();

        assert_eq!(last_commit_subject(repo.path())?, "Update initial");
        assert_eq!(dispatcher.overlay_of(&path), Some(VCItemStatus::UpToDate));
        Ok(())
    }

    #[test]
    fn test_commit_of_untracked_paths_does_nothing() -> anyhow::Result<()> {
        let repo = create_mixed_repo()?;
        let prompter = Arc::new(QueuedPrompter::default());
        let mut dispatcher = attach(&repo, Settings::default(), prompter);

        let paths: Vec<PathBuf> = vec![repo.file("notes.txt")];
        assert!(!dispatcher.commit(&paths, "Nothing"));
        assert_eq!(last_commit_subject(repo.path())?, "Add sources");
        Ok(())
    }
}
