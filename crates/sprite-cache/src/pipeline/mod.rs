// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Background load and unload pipelines.
//!
//! Both pipelines are a bounded queue drained by worker threads. The request
//! path feeds the load queue and falls back to loading inline when it is
//! full; releases feed the unload queue, which debounces eviction.

pub(crate) mod load;
pub(crate) mod unload;
