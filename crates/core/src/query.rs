//! List view query: sort column, sort order and filters

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    Name,
    LastPlayed,
    #[default]
    Playtime,
}

impl SortColumn {
    /// Unknown values fall back to playtime
    pub fn parse(value: &str) -> Self {
        match value {
            "alphabetical" | "name" => SortColumn::Name,
            "lastPlayed" => SortColumn::LastPlayed,
            _ => SortColumn::Playtime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Only `desc` sorts descending, anything else ascends
    pub fn parse(value: &str) -> Self {
        if value == "desc" {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

/// Played-state filter: All, only played, only unplayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayFilter {
    #[default]
    All,
    Played,
    Unplayed,
}

impl PlayFilter {
    /// Both flags set (or neither) means no filtering
    pub fn from_flags(played_only: bool, unplayed_only: bool) -> Self {
        match (played_only, unplayed_only) {
            (true, false) => PlayFilter::Played,
            (false, true) => PlayFilter::Unplayed,
            _ => PlayFilter::All,
        }
    }

    pub fn matches(&self, playtime_forever: u32) -> bool {
        match self {
            PlayFilter::All => true,
            PlayFilter::Played => playtime_forever > 0,
            PlayFilter::Unplayed => playtime_forever == 0,
        }
    }
}

/// Raw query string of `GET /steam/games`
///
/// The three flags are presence-based: `?playedOnly` and `?playedOnly=false`
/// both switch the filter on.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameListParams {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub played_only: Option<String>,
    pub unplayed_only: Option<String>,
    pub favourites_only: Option<String>,
}

/// Parsed list view query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameListQuery {
    pub sort: SortColumn,
    pub order: SortOrder,
    pub play: PlayFilter,
    pub favourites_only: bool,
}

impl From<GameListParams> for GameListQuery {
    fn from(params: GameListParams) -> Self {
        Self {
            sort: params.sort.as_deref().map(SortColumn::parse).unwrap_or_default(),
            order: params.order.as_deref().map(SortOrder::parse).unwrap_or_default(),
            play: PlayFilter::from_flags(
                params.played_only.is_some(),
                params.unplayed_only.is_some(),
            ),
            favourites_only: params.favourites_only.is_some(),
        }
    }
}
