use screen_core::config::{DefaultsConfig, default_aliases};
use screen_core::index::{Screen, ScreenIndex};
use screen_nav::interpret::{Origin, QueryArgs, Strategy, plan};
use screen_nav::refine::{Presentation, collapse_versions, refine};
use screen_nav::score::{
    group_results, flatten_groups, rank, score_screen, search_all, search_project, search_scoped,
};

fn make_screen(project: &str, version: &str, id: &str, title: &str, description: &str) -> Screen {
    Screen {
        screen_id: id.to_string(),
        page_title: title.to_string(),
        author: "N/A".to_string(),
        description: description.to_string(),
        keywords: Vec::new(),
        project: project.to_string(),
        version: version.to_string(),
        file_id: format!("{project}-{version}"),
        file_name: format!("{project} {version}"),
        node_id: format!("{id}-node"),
        last_modified: String::new(),
    }
}

fn make_index() -> ScreenIndex {
    let mut index = ScreenIndex::new();
    let rows = [
        ("CONTRABASS", "3.0.6", "CONT-01_01_01", "User Management", "Create and edit user accounts"),
        ("CONTRABASS", "3.0.6", "CONT-01_01_02", "User Detail", "Shows a single user profile"),
        ("CONTRABASS", "3.0.6", "CONT-05_04_54", "Alert Policy", "Alert thresholds per cluster"),
        ("CONTRABASS", "3.0.5", "CONT-01_01_01", "User Management", ""),
        ("VIOLA", "1.2.0", "VIO-02_01_01", "Dashboard", "Cluster health overview"),
        ("VIOLA", "1.2.0", "VIO-02_01_02", "User Settings", ""),
    ];
    for (project, version, id, title, description) in rows {
        index.add_screen(make_screen(project, version, id, title, description));
    }
    index
}

#[test]
fn test_scoring_is_monotonic_in_keywords() {
    let index = make_index();
    let screen = index
        .find_screen("CONTRABASS", "3.0.6", "CONT-01_01_01")
        .unwrap();
    let base = vec!["user".to_string()];
    let extended = vec!["user".to_string(), "management".to_string()];
    let unrelated = vec!["user".to_string(), "billing".to_string()];
    let (s1, _) = score_screen(screen, &base);
    let (s2, _) = score_screen(screen, &extended);
    let (s3, _) = score_screen(screen, &unrelated);
    assert!(s2 > s1);
    assert_eq!(s3, s1);
}

#[test]
fn test_repeated_query_words_count_once() {
    let index = make_index();
    let once = rank(index.screens(), "alert policy", 5);
    let repeated = rank(index.screens(), "alert alert ALERT policy", 5);
    assert_eq!(once.len(), 1);
    assert_eq!(repeated.len(), 1);
    assert_eq!(repeated[0].score, once[0].score);
    assert_eq!(repeated[0].matched_keywords, vec!["alert", "policy"]);
}

#[test]
fn test_rank_is_sorted_and_limited() {
    let index = make_index();
    let results = rank(index.screens(), "user", 3);
    assert_eq!(results.len(), 3);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(results.iter().all(|r| r.matched_keywords == vec!["user"]));
}

#[test]
fn test_scoped_search_stays_in_version() {
    let index = make_index();
    let results = search_scoped(&index, "contrabass", "3.0.6", "user", 5);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.screen.version == "3.0.6"));
    assert!(search_scoped(&index, "CONTRABASS", "9.9.9", "user", 5).is_empty());
}

#[test]
fn test_project_search_spans_versions() {
    let index = make_index();
    let results = search_project(&index, "CONTRABASS", "user management", 5);
    let versions: Vec<&str> = results.iter().map(|r| r.screen.version.as_str()).collect();
    assert!(versions.contains(&"3.0.5"));
    assert!(versions.contains(&"3.0.6"));
    assert!(results.iter().all(|r| r.screen.project == "CONTRABASS"));
}

#[test]
fn test_global_search_groups_first_seen() {
    let index = make_index();
    let results = search_all(&index, "user", None, 20);
    let groups = group_results(results.clone());
    let projects: Vec<&str> = groups.iter().map(|g| g.project.as_str()).collect();
    assert_eq!(projects[0], results[0].screen.project);
    assert_eq!(groups.iter().map(|g| g.len()).sum::<usize>(), results.len());
    assert_eq!(flatten_groups(&groups).len(), results.len());

    let only_120 = search_all(&index, "user", Some("1.2.0"), 20);
    assert_eq!(only_120.len(), 1);
    assert_eq!(only_120[0].screen.screen_id, "VIO-02_01_02");
}

#[test]
fn test_version_collapse_lists_each_version_once() {
    let mut index = ScreenIndex::new();
    index.add_screen(make_screen("CONTRABASS", "1.0.0", "CONT-03_00_01", "Node List", ""));
    index.add_screen(make_screen("CONTRABASS", "2.0.0", "CONT-03_00_01", "Node List", ""));
    index.add_screen(make_screen("CONTRABASS", "2.0.0", "CONT-03_00_02", "Node Detail", ""));

    let results = search_project(&index, "CONTRABASS", "node list", 5);
    let versions = collapse_versions(&results).unwrap();
    let mut listed: Vec<&str> = versions.iter().map(|r| r.screen.version.as_str()).collect();
    listed.sort_unstable();
    assert_eq!(listed, vec!["1.0.0", "2.0.0"]);

    match refine(results, "node list", &default_aliases()) {
        Presentation::Versions(v) => assert_eq!(v.len(), 2),
        Presentation::Screens(_) => panic!("expected a version-only choice"),
    }
}

#[test]
fn test_phrase_priority_filters_to_phrase_matches() {
    let index = make_index();
    let results = search_scoped(&index, "CONTRABASS", "3.0.6", "user management screen", 5);
    assert!(results.len() >= 2);

    match refine(results, "user management screen", &default_aliases()) {
        Presentation::Screens(screens) => {
            assert_eq!(screens.len(), 1);
            assert_eq!(screens[0].screen.screen_id, "CONT-01_01_01");
        }
        Presentation::Versions(_) => panic!("single version scope cannot collapse"),
    }
}

#[test]
fn test_plan_strategies() {
    let aliases = default_aliases();
    let defaults = DefaultsConfig::default();
    let planned = |query: &str, project: Option<&str>, version: Option<&str>| {
        plan(
            &QueryArgs {
                query,
                project,
                version,
            },
            &aliases,
            &defaults,
        )
    };

    assert_eq!(planned("2", None, None), Strategy::Select { index: 2 });

    match planned("CONT-05_04_54", None, None) {
        Strategy::DirectLookup {
            screen_id,
            project,
            version,
        } => {
            assert_eq!(screen_id, "CONT-05_04_54");
            // "cont" in the id is also a project alias
            assert_eq!(project.value, "CONTRABASS");
            assert_eq!(version.value, "3.0.6");
            assert_eq!(version.origin, Origin::Default);
        }
        other => panic!("unexpected strategy {other:?}"),
    }

    let scoped = planned("콘트라베이스 3.0.6 사용자 관리", None, None);
    assert!(matches!(scoped, Strategy::ScopedSearch { .. }));
    assert!(scoped.allows_auto_confirm(true));
    assert!(!scoped.allows_auto_confirm(false));

    let project_only = planned("user list", Some("viola"), None);
    assert!(matches!(
        project_only,
        Strategy::ProjectSearch { ref project } if project.value == "VIOLA"
    ));
    assert!(!project_only.allows_auto_confirm(true));

    let global = planned("alert policy", None, None);
    assert_eq!(global, Strategy::GlobalSearch { version: None });
    assert!(!global.allows_auto_confirm(true));

    let global_versioned = planned("alert policy", None, Some("3.0.6"));
    assert!(global_versioned.allows_auto_confirm(true));
}
