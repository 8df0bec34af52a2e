pub(crate) mod best_players;
