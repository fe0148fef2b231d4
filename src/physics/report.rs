/*
ptanks
Copyright (C) 2025  Oreste Bernardi

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use super::surface::PaintableSurface;
use csv;
use std::fs::File;
use std::path::Path;

pub(super) fn save_paint_report<'a, P: AsRef<Path>>(
    path: P,
    surfaces: impl Iterator<Item = &'a PaintableSurface>,
) -> std::io::Result<()> {
    let file = File::create(path.as_ref())?;
    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(["Surface", "TextureSize", "PaintOps", "PaintedTexels", "Coverage"])?;
    for surface in surfaces {
        let texture_size = surface.texture_size();
        let painted = surface.painted_texels();
        let total = (texture_size as u64).pow(2);
        let coverage = if total > 0 {
            painted as f64 / total as f64
        } else {
            0.0
        };
        wtr.write_record([
            surface.name.as_str(),
            &format!("{}", texture_size),
            &format!("{}", surface.paint_ops()),
            &format!("{}", painted),
            &format!("{:.6}", coverage),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
