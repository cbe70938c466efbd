// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Rendered config and container files.

/// Port container runtimes listen on.
pub const CONTAINER_PORT: u16 = 8081;

/// `smithery.yaml` for runtimes the platform builds natively.
#[must_use]
pub fn native_config(runtime: &str) -> String {
    format!("runtime: {runtime}\n")
}

/// `smithery.yaml` for a Dockerfile-built server.
#[must_use]
pub fn container_config() -> String {
    format!(
        "runtime: container\n\
         build:\n\
         \x20 dockerfile: Dockerfile\n\
         \x20 dockerBuildPath: .\n\
         startCommand:\n\
         \x20 type: http\n\
         \x20 port: {CONTAINER_PORT}\n"
    )
}

#[must_use]
pub fn node_dockerfile() -> String {
    format!(
        "FROM node:22-slim\n\
         WORKDIR /app\n\
         COPY package*.json ./\n\
         RUN npm ci --omit=dev || npm install --omit=dev\n\
         COPY . .\n\
         ENV PORT={CONTAINER_PORT}\n\
         EXPOSE {CONTAINER_PORT}\n\
         CMD [\"npm\", \"start\"]\n"
    )
}

#[must_use]
pub fn go_dockerfile() -> String {
    format!(
        "FROM golang:1.23 AS build\n\
         WORKDIR /src\n\
         COPY go.* ./\n\
         RUN go mod download\n\
         COPY . .\n\
         RUN CGO_ENABLED=0 go build -o /out/server .\n\
         \n\
         FROM gcr.io/distroless/static-debian12\n\
         COPY --from=build /out/server /server\n\
         ENV PORT={CONTAINER_PORT}\n\
         EXPOSE {CONTAINER_PORT}\n\
         ENTRYPOINT [\"/server\"]\n"
    )
}

/// `binary` is the Cargo package name.
#[must_use]
pub fn rust_dockerfile(binary: &str) -> String {
    format!(
        "FROM rust:1-slim AS build\n\
         WORKDIR /src\n\
         COPY . .\n\
         RUN cargo build --release --locked || cargo build --release\n\
         \n\
         FROM debian:bookworm-slim\n\
         RUN apt-get update && apt-get install -y --no-install-recommends ca-certificates && rm -rf /var/lib/apt/lists/*\n\
         COPY --from=build /src/target/release/{binary} /usr/local/bin/server\n\
         ENV PORT={CONTAINER_PORT}\n\
         EXPOSE {CONTAINER_PORT}\n\
         ENTRYPOINT [\"/usr/local/bin/server\"]\n"
    )
}
