use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;
use vidvault_core::models::{
    ContinueWatching, Episode, EpisodeWithProgress, LibraryListing, Media, MediaDeletion,
    MediaFile, MediaKind, Movie, NewEpisode, NewMovie, NewTvShow, PlaybackProgress,
    ProgressUpdate, TvShow, User,
};
use vidvault_core::AppError;

use crate::traits::{MediaStore, ProgressStore, UserStore};

#[derive(Default)]
struct LibraryData {
    users: Vec<User>,
    movies: Vec<Movie>,
    shows: Vec<TvShow>,
    episodes: Vec<Episode>,
    progress: Vec<PlaybackProgress>,
}

impl LibraryData {
    fn progress_for(&self, owner_id: Uuid, kind: MediaKind, media_id: Uuid) -> Option<&PlaybackProgress> {
        self.progress
            .iter()
            .find(|p| p.owner_id == owner_id && p.media_kind == kind && p.media_id == media_id)
    }

    fn find_media(&self, kind: MediaKind, id: Uuid) -> Option<Media> {
        match kind {
            MediaKind::Movie => self
                .movies
                .iter()
                .find(|m| m.id == id)
                .cloned()
                .map(Media::from),
            MediaKind::Episode => self
                .episodes
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .map(Media::from),
        }
    }
}

/// Mutex-backed library standing in for PostgreSQL
#[derive(Clone, Default)]
pub struct InMemoryLibrary {
    data: Arc<Mutex<LibraryData>>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, LibraryData> {
        self.data.lock().unwrap()
    }

    pub fn movies(&self) -> Vec<Movie> {
        self.data().movies.clone()
    }

    pub fn shows(&self) -> Vec<TvShow> {
        self.data().shows.clone()
    }

    pub fn episodes(&self) -> Vec<Episode> {
        self.data().episodes.clone()
    }

    pub fn progress(&self) -> Vec<PlaybackProgress> {
        self.data().progress.clone()
    }
}

#[async_trait]
impl UserStore for InMemoryLibrary {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut data = self.data();
        if data.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                username
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        data.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .data()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl MediaStore for InMemoryLibrary {
    async fn count_media_files(&self, owner_id: Uuid) -> Result<i64, AppError> {
        let data = self.data();
        let movies = data.movies.iter().filter(|m| m.owner_id == owner_id).count();
        let episodes = data
            .episodes
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .count();
        Ok((movies + episodes) as i64)
    }

    async fn create_movie(&self, movie: NewMovie) -> Result<Movie, AppError> {
        let movie = Movie {
            id: Uuid::new_v4(),
            owner_id: movie.owner_id,
            title: movie.title,
            overview: movie.overview,
            poster_url: movie.poster_url,
            release_year: movie.release_year,
            duration: movie.duration,
            storage_path: movie.storage_path,
            created_at: Utc::now(),
        };
        self.data().movies.push(movie.clone());
        Ok(movie)
    }

    async fn create_episode(
        &self,
        show: NewTvShow,
        episode: NewEpisode,
    ) -> Result<(TvShow, Episode), AppError> {
        let mut data = self.data();

        let existing = data
            .shows
            .iter()
            .find(|s| s.owner_id == show.owner_id && s.tmdb_id == show.tmdb_id)
            .cloned();
        let show = match existing {
            Some(show) => show,
            None => {
                let created = TvShow {
                    id: Uuid::new_v4(),
                    owner_id: show.owner_id,
                    tmdb_id: show.tmdb_id,
                    title: show.title,
                    overview: show.overview,
                    poster_url: show.poster_url,
                    created_at: Utc::now(),
                };
                data.shows.push(created.clone());
                created
            }
        };

        let episode = Episode {
            id: Uuid::new_v4(),
            show_id: show.id,
            owner_id: show.owner_id,
            season_number: episode.season_number,
            episode_number: episode.episode_number,
            title: episode.title,
            duration: episode.duration,
            storage_path: episode.storage_path,
            created_at: Utc::now(),
        };
        data.episodes.push(episode.clone());

        Ok((show, episode))
    }

    async fn find_media(&self, kind: MediaKind, id: Uuid) -> Result<Option<Media>, AppError> {
        Ok(self.data().find_media(kind, id))
    }

    async fn find_show(&self, id: Uuid) -> Result<Option<TvShow>, AppError> {
        Ok(self.data().shows.iter().find(|s| s.id == id).cloned())
    }

    async fn list_episodes_with_progress(
        &self,
        show_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<EpisodeWithProgress>, AppError> {
        let data = self.data();
        let mut episodes: Vec<EpisodeWithProgress> = data
            .episodes
            .iter()
            .filter(|e| e.show_id == show_id)
            .map(|e| {
                let progress = data.progress_for(owner_id, MediaKind::Episode, e.id);
                EpisodeWithProgress {
                    id: e.id,
                    title: e.title.clone(),
                    season_number: e.season_number,
                    episode_number: e.episode_number,
                    duration: e.duration,
                    resume_position: progress.map_or(0.0, |p| p.resume_position),
                    is_watched: progress.is_some_and(|p| p.is_watched),
                }
            })
            .collect();
        episodes.sort_by_key(|e| (e.season_number, e.episode_number));
        Ok(episodes)
    }

    async fn delete_media(&self, media: &Media) -> Result<MediaDeletion, AppError> {
        let mut data = self.data();
        let (kind, id) = (media.kind(), media.id());
        data.progress
            .retain(|p| !(p.media_kind == kind && p.media_id == id));

        let removed_show_id = match media {
            Media::Movie(movie) => {
                let before = data.movies.len();
                data.movies.retain(|m| m.id != movie.id);
                if data.movies.len() == before {
                    return Err(AppError::NotFound("Movie not found".to_string()));
                }
                None
            }
            Media::Episode(episode) => {
                let before = data.episodes.len();
                data.episodes.retain(|e| e.id != episode.id);
                if data.episodes.len() == before {
                    return Err(AppError::NotFound("Episode not found".to_string()));
                }
                if data.episodes.iter().any(|e| e.show_id == episode.show_id) {
                    None
                } else {
                    data.shows.retain(|s| s.id != episode.show_id);
                    Some(episode.show_id)
                }
            }
        };

        Ok(MediaDeletion {
            storage_path: media.storage_path().to_string(),
            removed_show_id,
        })
    }

    async fn delete_show(&self, show: &TvShow) -> Result<Vec<String>, AppError> {
        let mut data = self.data();
        let before = data.shows.len();
        data.shows.retain(|s| s.id != show.id);
        if data.shows.len() == before {
            return Err(AppError::NotFound("TV show not found".to_string()));
        }

        let (removed, kept): (Vec<Episode>, Vec<Episode>) = std::mem::take(&mut data.episodes)
            .into_iter()
            .partition(|e| e.show_id == show.id);
        data.episodes = kept;
        data.progress.retain(|p| {
            !(p.media_kind == MediaKind::Episode && removed.iter().any(|e| e.id == p.media_id))
        });

        Ok(removed.into_iter().map(|e| e.storage_path).collect())
    }

    async fn library_listing(
        &self,
        owner_id: Uuid,
        recent_limit: i64,
    ) -> Result<LibraryListing, AppError> {
        let data = self.data();
        let limit = usize::try_from(recent_limit).unwrap_or(0);

        let mut movies: Vec<Movie> = data
            .movies
            .iter()
            .filter(|m| m.owner_id == owner_id)
            .cloned()
            .collect();
        let mut shows: Vec<TvShow> = data
            .shows
            .iter()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();

        let mut recently_added_movies = movies.clone();
        recently_added_movies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recently_added_movies.truncate(limit);

        let mut recently_added_shows = shows.clone();
        recently_added_shows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recently_added_shows.truncate(limit);

        movies.sort_by(|a, b| a.title.cmp(&b.title));
        shows.sort_by(|a, b| a.title.cmp(&b.title));

        Ok(LibraryListing {
            recently_added_movies,
            recently_added_shows,
            movies,
            shows,
        })
    }
}

#[async_trait]
impl ProgressStore for InMemoryLibrary {
    async fn save_progress(&self, update: ProgressUpdate) -> Result<PlaybackProgress, AppError> {
        let mut data = self.data();
        let now = Utc::now();

        if let Some(existing) = data.progress.iter_mut().find(|p| {
            p.owner_id == update.owner_id
                && p.media_kind == update.media_kind
                && p.media_id == update.media_id
        }) {
            existing.resume_position = update.resume_position;
            existing.is_watched = update.is_watched;
            existing.last_watched = now;
            return Ok(existing.clone());
        }

        let progress = PlaybackProgress {
            id: Uuid::new_v4(),
            owner_id: update.owner_id,
            media_kind: update.media_kind,
            media_id: update.media_id,
            resume_position: update.resume_position,
            is_watched: update.is_watched,
            last_watched: now,
        };
        data.progress.push(progress.clone());
        Ok(progress)
    }

    async fn continue_watching(
        &self,
        owner_id: Uuid,
        min_position: f64,
    ) -> Result<Vec<ContinueWatching>, AppError> {
        let data = self.data();
        let mut rows: Vec<PlaybackProgress> = data
            .progress
            .iter()
            .filter(|p| p.owner_id == owner_id && !p.is_watched && p.resume_position > min_position)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.last_watched.cmp(&a.last_watched));

        Ok(rows
            .into_iter()
            .filter_map(|progress| {
                data.find_media(progress.media_kind, progress.media_id)
                    .map(|media| ContinueWatching { media, progress })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidvault_core::models::is_watched;

    fn new_episode(season: i32, episode: i32, path: &str) -> NewEpisode {
        NewEpisode {
            season_number: season,
            episode_number: episode,
            title: format!("Episode {}", episode),
            duration: 100.0,
            storage_path: path.to_string(),
        }
    }

    fn new_show(owner_id: Uuid) -> NewTvShow {
        NewTvShow {
            owner_id,
            tmdb_id: 1399,
            title: "My Show".to_string(),
            overview: None,
            poster_url: None,
        }
    }

    #[tokio::test]
    async fn test_episodes_share_show_per_owner_and_tmdb_id() {
        let store = InMemoryLibrary::new();
        let owner = Uuid::new_v4();

        let (show_a, _) = store
            .create_episode(new_show(owner), new_episode(1, 2, "a"))
            .await
            .unwrap();
        let (show_b, _) = store
            .create_episode(new_show(owner), new_episode(1, 1, "b"))
            .await
            .unwrap();
        assert_eq!(show_a.id, show_b.id);
        assert_eq!(store.count_media_files(owner).await.unwrap(), 2);

        let listed = store
            .list_episodes_with_progress(show_a.id, owner)
            .await
            .unwrap();
        assert_eq!(listed[0].episode_number, 1);
        assert_eq!(listed[1].episode_number, 2);
        assert_eq!(listed[0].resume_position, 0.0);
        assert!(!listed[0].is_watched);
    }

    #[tokio::test]
    async fn test_deleting_last_episode_removes_show() {
        let store = InMemoryLibrary::new();
        let owner = Uuid::new_v4();
        let (show, episode) = store
            .create_episode(new_show(owner), new_episode(1, 1, "ep1"))
            .await
            .unwrap();

        let media = Media::from(episode);
        store
            .save_progress(ProgressUpdate::for_media(owner, &media, 40.0))
            .await
            .unwrap();

        let deletion = store.delete_media(&media).await.unwrap();
        assert_eq!(deletion.storage_path, "ep1");
        assert_eq!(deletion.removed_show_id, Some(show.id));
        assert!(store.shows().is_empty());
        assert!(store.progress().is_empty());
    }

    #[tokio::test]
    async fn test_progress_upsert_and_continue_watching() {
        let store = InMemoryLibrary::new();
        let owner = Uuid::new_v4();
        let movie = store
            .create_movie(NewMovie {
                owner_id: owner,
                title: "Heat".to_string(),
                overview: None,
                poster_url: None,
                release_year: Some(1995),
                duration: 100.0,
                storage_path: "heat.mp4".to_string(),
            })
            .await
            .unwrap();
        let media = Media::from(movie);

        store
            .save_progress(ProgressUpdate::for_media(owner, &media, 45.0))
            .await
            .unwrap();
        let rows = store.continue_watching(owner, 30.0).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].media.id(), media.id());

        let updated = store
            .save_progress(ProgressUpdate::for_media(owner, &media, 96.0))
            .await
            .unwrap();
        assert_eq!(updated.is_watched, is_watched(96.0, 100.0));
        assert_eq!(store.progress().len(), 1);
        assert!(store.continue_watching(owner, 30.0).await.unwrap().is_empty());
    }
}
