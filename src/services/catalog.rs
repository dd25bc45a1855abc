use crate::domain::storage::{CatalogStore, RowRange, ViewQuery};
use crate::domain::{Game, GameRow, GamesPage, TranslationStatus};
use crate::error::{Result, SiteError};
use crate::utils::sort_uk;
use moka::future::Cache;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub offset: usize,
    pub limit: usize,
    pub text: Option<String>,
    pub status: Option<TranslationStatus>,
    pub team: Option<String>,
}

impl SearchQuery {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit,
            ..Default::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into()).filter(|t: &String| !t.is_empty());
        self
    }

    pub fn status(mut self, status: TranslationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into()).filter(|t: &String| !t.is_empty());
        self
    }
}

/// `"all"` and an absent value both mean no status filter.
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<TranslationStatus>> {
    match raw {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(SiteError::BadRequest),
    }
}

/// How a search is served. The view can only range and filter on its own
/// columns, so predicates on the embedded translations force a full scan.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    Indexed(ViewQuery),
    Scan {
        view: ViewQuery,
        status: Option<TranslationStatus>,
        team: Option<String>,
    },
}

impl QueryPlan {
    pub fn for_query(query: &SearchQuery) -> Self {
        let name_contains = query.text.clone().filter(|t| !t.is_empty());
        let team = query.team.clone().filter(|t| !t.is_empty());

        if query.status.is_none() && team.is_none() {
            return QueryPlan::Indexed(ViewQuery {
                name_contains,
                range: Some(RowRange {
                    offset: query.offset,
                    limit: query.limit,
                }),
                exact_count: true,
                ..Default::default()
            });
        }

        QueryPlan::Scan {
            view: ViewQuery {
                name_contains,
                ..Default::default()
            },
            status: query.status,
            team,
        }
    }

    fn matches(status: Option<TranslationStatus>, team: Option<&str>, game: &Game) -> bool {
        status.map_or(true, |s| game.has_status(s)) && team.map_or(true, |t| game.has_team(t))
    }
}

fn valid_games(rows: Vec<GameRow>) -> impl Iterator<Item = Game> {
    rows.into_iter().filter_map(GameRow::into_game)
}

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    teams: Cache<(), Arc<Vec<String>>>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore + 'static>, teams_ttl: Duration) -> Self {
        Self {
            store,
            teams: Cache::builder().max_capacity(1).time_to_live(teams_ttl).build(),
        }
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<GamesPage> {
        if query.offset.checked_add(query.limit).is_none() {
            return Err(SiteError::BadRequest(format!(
                "offset {} is out of range",
                query.offset
            )));
        }

        match QueryPlan::for_query(query) {
            QueryPlan::Indexed(view) => {
                let page = self.store.query_view(&view).await?;
                let total = page.count.unwrap_or(0);
                let games: Vec<Game> = valid_games(page.rows).collect();

                debug!("Indexed search returned {} of {total} games", games.len());
                Ok(GamesPage::new(games, total, query.offset, query.limit))
            }
            QueryPlan::Scan { view, status, team } => {
                let page = self.store.query_view(&view).await?;
                let matching: Vec<Game> = valid_games(page.rows)
                    .filter(|game| QueryPlan::matches(status, team.as_deref(), game))
                    .collect();

                let total = matching.len();
                let games: Vec<Game> = matching
                    .into_iter()
                    .skip(query.offset)
                    .take(query.limit)
                    .collect();

                debug!(
                    "Scan search (status {:?}, team {:?}) kept {total} games",
                    status, team
                );
                Ok(GamesPage::new(games, total, query.offset, query.limit))
            }
        }
    }

    pub async fn count(&self) -> Result<usize> {
        let page = self
            .store
            .query_view(&ViewQuery {
                exact_count: true,
                head: true,
                ..Default::default()
            })
            .await?;

        Ok(page.count.unwrap_or(0))
    }

    pub async fn game(&self, slug: &str) -> Result<Option<Game>> {
        let page = self
            .store
            .query_view(&ViewQuery {
                slug: Some(slug.to_string()),
                range: Some(RowRange {
                    offset: 0,
                    limit: 1,
                }),
                ..Default::default()
            })
            .await?;

        Ok(valid_games(page.rows).next())
    }

    /// Distinct teams of approved translations in Ukrainian collation order.
    pub async fn teams(&self) -> Result<Arc<Vec<String>>> {
        if let Some(teams) = self.teams.get(&()).await {
            return Ok(teams);
        }

        let rows = self.store.approved_teams().await?;
        let mut seen = FxHashSet::default();
        let mut teams: Vec<String> = rows
            .into_iter()
            .filter(|team| seen.insert(team.clone()))
            .collect();
        sort_uk(&mut teams);

        info!("Loaded {} distinct teams", teams.len());
        let teams = Arc::new(teams);
        self.teams.insert((), Arc::clone(&teams)).await;
        Ok(teams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{game_row, translation, MockCatalog};
    use pretty_assertions::assert_eq;

    fn catalog() -> MockCatalog {
        MockCatalog::new(vec![
            game_row(
                "witcher-3",
                "The Witcher 3",
                vec![translation("Kinetix & Friends", "completed")],
            ),
            game_row(
                "stalker",
                "S.T.A.L.K.E.R.",
                vec![
                    translation("Team A", "in-progress"),
                    translation("Solo", "planned"),
                ],
            ),
            game_row(
                "disco",
                "Disco Elysium",
                vec![translation("Team A & Team B", "completed")],
            ),
            game_row("hades", "Hades", vec![translation("Kinetix", "planned")]),
            game_row("outer-wilds", "Outer Wilds", vec![]),
            GameRow {
                slug: None,
                name: Some("Corrupt".into()),
                ..Default::default()
            },
            GameRow {
                slug: Some("nameless".into()),
                name: None,
                translations: serde_json::json!([{"team": "Kinetix", "status": "completed"}]),
                ..Default::default()
            },
        ])
    }

    fn service(store: MockCatalog) -> CatalogService {
        CatalogService::new(Arc::new(store), Duration::from_secs(600))
    }

    fn slugs(page: &GamesPage) -> Vec<&str> {
        page.games.iter().map(|g| g.slug.as_str()).collect()
    }

    #[test]
    fn plans_by_predicate_shape() {
        assert!(matches!(
            QueryPlan::for_query(&SearchQuery::new(0, 12).text("wit")),
            QueryPlan::Indexed(ViewQuery {
                range: Some(RowRange { offset: 0, limit: 12 }),
                exact_count: true,
                ..
            })
        ));
        assert!(matches!(
            QueryPlan::for_query(&SearchQuery::new(0, 12).team("Kinetix")),
            QueryPlan::Scan { view: ViewQuery { range: None, .. }, .. }
        ));
        assert!(matches!(
            QueryPlan::for_query(&SearchQuery::new(0, 12).status(TranslationStatus::Planned)),
            QueryPlan::Scan { .. }
        ));
        assert!(matches!(
            QueryPlan::for_query(&SearchQuery::new(0, 12).team("")),
            QueryPlan::Indexed(_)
        ));
    }

    #[test]
    fn status_all_is_no_filter() {
        assert_eq!(parse_status_filter(Some("all")).unwrap(), None);
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("completed")).unwrap(),
            Some(TranslationStatus::Completed)
        );
        assert!(matches!(
            parse_status_filter(Some("done")),
            Err(SiteError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn unfiltered_pages_are_bounded_and_sorted() {
        let service = service(catalog());

        // The corrupt row sorts first and is dropped after the range is cut.
        let first = service.search(&SearchQuery::new(0, 2)).await.unwrap();
        assert_eq!(slugs(&first), vec!["disco"]);
        assert_eq!(first.total, 7);
        assert!(first.has_more);
        assert_eq!(first.next_offset, 2);

        let last = service.search(&SearchQuery::new(6, 2)).await.unwrap();
        assert!(last.games.len() <= 2);
        assert!(!last.has_more);
        assert_eq!(last.next_offset, 8);
    }

    #[tokio::test]
    async fn overflowing_offset_is_rejected_before_querying() {
        let store = catalog();
        let service = service(store.clone());

        for query in [
            SearchQuery::new(usize::MAX, 12),
            SearchQuery::new(usize::MAX - 5, 12).team("Kinetix"),
        ] {
            let err = service.search(&query).await.unwrap_err();
            assert!(matches!(err, SiteError::BadRequest(_)));
        }
        assert!(store.requests().is_empty());
    }

    #[tokio::test]
    async fn offset_past_the_end_is_an_empty_page() {
        let service = service(catalog());

        let page = service.search(&SearchQuery::new(1_000, 12)).await.unwrap();
        assert!(page.games.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.next_offset, 1_012);
    }

    #[tokio::test]
    async fn corrupt_rows_are_dropped_on_the_indexed_path() {
        let service = service(catalog());

        let page = service.search(&SearchQuery::new(0, 100)).await.unwrap();
        assert_eq!(
            slugs(&page),
            vec!["disco", "hades", "outer-wilds", "stalker", "witcher-3"]
        );
    }

    #[tokio::test]
    async fn text_filter_is_case_insensitive() {
        let service = service(catalog());

        let page = service
            .search(&SearchQuery::new(0, 12).text("WITCH"))
            .await
            .unwrap();
        assert_eq!(slugs(&page), vec!["witcher-3"]);
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn team_filter_matches_joint_credits() {
        let service = service(catalog());

        let page = service
            .search(&SearchQuery::new(0, 12).team("Team A"))
            .await
            .unwrap();
        assert_eq!(slugs(&page), vec!["disco", "stalker"]);
        assert_eq!(page.total, 2);
        assert!(!page.has_more);

        let page = service
            .search(&SearchQuery::new(0, 12).team("Kinetix"))
            .await
            .unwrap();
        assert_eq!(slugs(&page), vec!["hades", "witcher-3"]);
        assert!(page.games.iter().all(|g| g.has_team("Kinetix")));
    }

    #[tokio::test]
    async fn status_filter_keeps_games_with_any_matching_translation() {
        let service = service(catalog());

        let page = service
            .search(&SearchQuery::new(0, 12).status(TranslationStatus::Planned))
            .await
            .unwrap();
        assert_eq!(slugs(&page), vec!["hades", "stalker"]);
        assert!(page
            .games
            .iter()
            .all(|g| g.has_status(TranslationStatus::Planned)));
    }

    #[tokio::test]
    async fn filters_combine_with_text() {
        let service = service(catalog());

        let page = service
            .search(
                &SearchQuery::new(0, 12)
                    .text("s")
                    .status(TranslationStatus::Completed)
                    .team("Team"),
            )
            .await
            .unwrap();
        assert_eq!(slugs(&page), vec!["disco"]);
    }

    #[tokio::test]
    async fn scan_path_paginates_in_memory() {
        let store = catalog();
        let service = service(store.clone());
        let query = SearchQuery::new(1, 1).status(TranslationStatus::Completed);

        let page = service.search(&query).await.unwrap();
        assert_eq!(slugs(&page), vec!["witcher-3"]);
        assert_eq!(page.total, 2);
        assert!(!page.has_more);
        assert_eq!(page.next_offset, 2);

        let requests = store.requests();
        assert_eq!(requests.last().unwrap().range, None);
    }

    #[tokio::test]
    async fn repeated_filtered_query_is_stable() {
        let service = service(catalog());
        let query = SearchQuery::new(0, 12).team("a");

        let first = service.search(&query).await.unwrap();
        let second = service.search(&query).await.unwrap();

        assert_eq!(first.total, second.total);
        assert_eq!(slugs(&first), slugs(&second));
    }

    #[tokio::test]
    async fn store_errors_surface_once() {
        let store = catalog().failing("JWT expired");
        let service = service(store.clone());

        let err = service.search(&SearchQuery::new(0, 12)).await.unwrap_err();
        assert_eq!(err.to_string(), "JWT expired");
        assert_eq!(store.requests().len(), 1);
    }

    #[tokio::test]
    async fn counts_rows_of_the_view() {
        let service = service(catalog());
        assert_eq!(service.count().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn looks_up_a_single_game() {
        let service = service(catalog());

        let game = service.game("stalker").await.unwrap().unwrap();
        assert_eq!(game.name, "S.T.A.L.K.E.R.");
        assert_eq!(game.translations.len(), 2);

        assert!(service.game("missing").await.unwrap().is_none());
        assert!(service.game("nameless").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn teams_are_distinct_collated_and_cached() {
        let store =
            catalog().with_teams(vec!["Шлях", "Kinetix", "Авалон", "Kinetix", "Team A"]);
        let service = service(store.clone());

        let teams = service.teams().await.unwrap();
        assert_eq!(*teams, vec!["Kinetix", "Team A", "Авалон", "Шлях"]);

        service.teams().await.unwrap();
        assert_eq!(store.team_requests(), 1);
    }
}
