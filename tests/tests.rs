// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod engine;
mod expressions;
mod literal;
mod tolerance;
mod value;
