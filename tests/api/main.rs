mod broadcast;
mod upstream_clients;
